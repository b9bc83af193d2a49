use std::sync::Arc;

use larder_infra::{AppConfig, CsvRepository, LarderService, Repository};

/// The service every handler talks to. The repository is boxed so tests can
/// swap the data directory or the backend without touching the handlers.
pub type AppServices = LarderService<Arc<dyn Repository>>;

pub fn build_services(config: &AppConfig) -> AppServices {
    let repo: Arc<dyn Repository> = Arc::new(CsvRepository::new(config.data_dir.clone()));
    LarderService::new(repo, config.negative_stock)
}
