use std::sync::RwLock;

use larder_inventory::{CatalogEntry, InventoryRecord, MovementRecord};
use larder_purchasing::{PurchaseOrder, VendorRule};

use super::Repository;
use crate::storage::StorageError;

#[derive(Debug, Default)]
struct Tables {
    inventory: Vec<InventoryRecord>,
    movements: Vec<MovementRecord>,
    catalog: Vec<CatalogEntry>,
    vendors: Vec<VendorRule>,
    orders: Vec<PurchaseOrder>,
}

/// In-memory repository for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    inner: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(self, entries: Vec<CatalogEntry>) -> Self {
        self.write(|t| t.catalog = entries);
        self
    }

    pub fn with_vendor_rules(self, rules: Vec<VendorRule>) -> Self {
        self.write(|t| t.vendors = rules);
        self
    }

    pub fn with_inventory(self, records: Vec<InventoryRecord>) -> Self {
        self.write(|t| t.inventory = records);
        self
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    fn write(&self, f: impl FnOnce(&mut Tables)) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl Repository for InMemoryRepository {
    fn load_inventory(&self) -> Result<Vec<InventoryRecord>, StorageError> {
        Ok(self.read(|t| t.inventory.clone()))
    }

    fn save_inventory(&self, records: &[InventoryRecord]) -> Result<(), StorageError> {
        self.write(|t| t.inventory = records.to_vec());
        Ok(())
    }

    fn load_movements(&self) -> Result<Vec<MovementRecord>, StorageError> {
        Ok(self.read(|t| t.movements.clone()))
    }

    fn save_movements(&self, movements: &[MovementRecord]) -> Result<(), StorageError> {
        self.write(|t| t.movements = movements.to_vec());
        Ok(())
    }

    fn load_catalog(&self) -> Result<Vec<CatalogEntry>, StorageError> {
        Ok(self.read(|t| t.catalog.clone()))
    }

    fn save_catalog(&self, entries: &[CatalogEntry]) -> Result<(), StorageError> {
        self.write(|t| t.catalog = entries.to_vec());
        Ok(())
    }

    fn load_vendor_rules(&self) -> Result<Vec<VendorRule>, StorageError> {
        Ok(self.read(|t| t.vendors.clone()))
    }

    fn save_vendor_rules(&self, rules: &[VendorRule]) -> Result<(), StorageError> {
        self.write(|t| t.vendors = rules.to_vec());
        Ok(())
    }

    fn load_orders(&self) -> Result<Vec<PurchaseOrder>, StorageError> {
        Ok(self.read(|t| t.orders.clone()))
    }

    fn save_orders(&self, orders: &[PurchaseOrder]) -> Result<(), StorageError> {
        self.write(|t| t.orders = orders.to_vec());
        Ok(())
    }
}
