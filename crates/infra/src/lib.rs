//! Infrastructure layer: flat-file storage, configuration, the transactional
//! service that fronts the domain crates, and exports.

pub mod config;
pub mod export;
pub mod repository;
pub mod service;
pub mod storage;

pub use config::{AppConfig, ConfigError};
pub use export::ExportError;
pub use repository::{CsvRepository, InMemoryRepository, Repository};
pub use service::{LarderService, PlacedOrder, ServiceError, ServiceResult};
pub use storage::StorageError;
