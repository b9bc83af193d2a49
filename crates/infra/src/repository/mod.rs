//! Table persistence behind one trait, so the service does not care whether it
//! runs against the data directory or against memory.

mod csv_files;
mod in_memory;

use std::sync::Arc;

use larder_inventory::{CatalogEntry, InventoryRecord, MovementRecord};
use larder_purchasing::{PurchaseOrder, VendorRule};

use crate::storage::StorageError;

pub use csv_files::{
    CsvRepository, CATALOG_FILE, INVENTORY_FILE, MOVEMENTS_FILE, ORDERS_FILE, VENDORS_FILE,
};
pub use in_memory::InMemoryRepository;

/// Whole-table load/save. Saves replace the table.
pub trait Repository: Send + Sync {
    fn load_inventory(&self) -> Result<Vec<InventoryRecord>, StorageError>;
    fn save_inventory(&self, records: &[InventoryRecord]) -> Result<(), StorageError>;

    fn load_movements(&self) -> Result<Vec<MovementRecord>, StorageError>;
    fn save_movements(&self, movements: &[MovementRecord]) -> Result<(), StorageError>;

    fn load_catalog(&self) -> Result<Vec<CatalogEntry>, StorageError>;
    fn save_catalog(&self, entries: &[CatalogEntry]) -> Result<(), StorageError>;

    fn load_vendor_rules(&self) -> Result<Vec<VendorRule>, StorageError>;
    fn save_vendor_rules(&self, rules: &[VendorRule]) -> Result<(), StorageError>;

    fn load_orders(&self) -> Result<Vec<PurchaseOrder>, StorageError>;
    fn save_orders(&self, orders: &[PurchaseOrder]) -> Result<(), StorageError>;
}

impl<R> Repository for Arc<R>
where
    R: Repository + ?Sized,
{
    fn load_inventory(&self) -> Result<Vec<InventoryRecord>, StorageError> {
        (**self).load_inventory()
    }

    fn save_inventory(&self, records: &[InventoryRecord]) -> Result<(), StorageError> {
        (**self).save_inventory(records)
    }

    fn load_movements(&self) -> Result<Vec<MovementRecord>, StorageError> {
        (**self).load_movements()
    }

    fn save_movements(&self, movements: &[MovementRecord]) -> Result<(), StorageError> {
        (**self).save_movements(movements)
    }

    fn load_catalog(&self) -> Result<Vec<CatalogEntry>, StorageError> {
        (**self).load_catalog()
    }

    fn save_catalog(&self, entries: &[CatalogEntry]) -> Result<(), StorageError> {
        (**self).save_catalog(entries)
    }

    fn load_vendor_rules(&self) -> Result<Vec<VendorRule>, StorageError> {
        (**self).load_vendor_rules()
    }

    fn save_vendor_rules(&self, rules: &[VendorRule]) -> Result<(), StorageError> {
        (**self).save_vendor_rules(rules)
    }

    fn load_orders(&self) -> Result<Vec<PurchaseOrder>, StorageError> {
        (**self).load_orders()
    }

    fn save_orders(&self, orders: &[PurchaseOrder]) -> Result<(), StorageError> {
        (**self).save_orders(orders)
    }
}
