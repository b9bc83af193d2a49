//! Inventory ledger domain module.
//!
//! This crate contains the business rules for the per-branch stock snapshot and
//! its append-only movement log, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod catalog;
pub mod ledger;
pub mod query;
pub mod record;
pub mod usage;

pub use catalog::{CatalogEntry, ItemCatalog};
pub use ledger::{
    DeleteOutcome, InventoryLedger, LogMovement, MovementOutcome, NegativeStockPolicy,
    RegisterItem, RegisterOutcome, StockWarning,
};
pub use query::{FilterOptions, InventoryFilter};
pub use record::{InventoryRecord, ItemKey, MovementRecord, MovementType};
pub use usage::{CategoryUsage, ItemUsage, UsagePeriod, UsageSummary};

/// Decimal type used for every quantity in the ledger.
pub use rust_decimal::Decimal;
