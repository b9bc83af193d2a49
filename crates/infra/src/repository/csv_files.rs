use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use larder_inventory::{CatalogEntry, InventoryRecord, MovementRecord};
use larder_purchasing::{PurchaseOrder, VendorRule};

use super::Repository;
use crate::storage::codec::{self, Decoded};
use crate::storage::table::{read_table, write_table, Table};
use crate::storage::{Schemas, StorageError, TableSchema};

pub const INVENTORY_FILE: &str = "inventory_data.csv";
pub const MOVEMENTS_FILE: &str = "stock_history.csv";
pub const CATALOG_FILE: &str = "food ingredients.txt";
pub const VENDORS_FILE: &str = "vendor_mapping.csv";
pub const ORDERS_FILE: &str = "orders_db.csv";

/// Repository over the flat files of one data directory.
#[derive(Debug, Clone)]
pub struct CsvRepository {
    dir: PathBuf,
    schemas: Schemas,
}

impl CsvRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            schemas: Schemas::default(),
        }
    }

    /// Replace the column layouts, e.g. to accept extra header aliases.
    pub fn with_schemas(mut self, schemas: Schemas) -> Self {
        self.schemas = schemas;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn load<T>(
        &self,
        file: &str,
        schema: &TableSchema,
        decode: impl FnOnce(&Path, &Table) -> Result<Decoded<T>, StorageError>,
    ) -> Result<Vec<T>, StorageError> {
        let path = self.path(file);
        let decoded = match read_table(&path, schema)? {
            Some(table) => decode(&path, &table)?,
            None => Decoded::all(Vec::new()),
        };
        if !decoded.skipped.is_empty() {
            warn!(file, lines = ?decoded.skipped, "rows without an item name skipped");
        }
        debug!(file, rows = decoded.rows.len(), "table loaded");
        Ok(decoded.rows)
    }

    fn save(
        &self,
        file: &str,
        schema: &TableSchema,
        delimiter: u8,
        rows: Vec<Vec<String>>,
    ) -> Result<(), StorageError> {
        let count = rows.len();
        write_table(&self.path(file), schema, delimiter, rows)?;
        debug!(file, rows = count, "table saved");
        Ok(())
    }
}

impl Repository for CsvRepository {
    fn load_inventory(&self) -> Result<Vec<InventoryRecord>, StorageError> {
        self.load(INVENTORY_FILE, &self.schemas.inventory, codec::decode_inventory)
    }

    fn save_inventory(&self, records: &[InventoryRecord]) -> Result<(), StorageError> {
        self.save(
            INVENTORY_FILE,
            &self.schemas.inventory,
            b',',
            codec::encode_inventory(records),
        )
    }

    fn load_movements(&self) -> Result<Vec<MovementRecord>, StorageError> {
        self.load(MOVEMENTS_FILE, &self.schemas.movements, codec::decode_movements)
    }

    fn save_movements(&self, movements: &[MovementRecord]) -> Result<(), StorageError> {
        self.save(
            MOVEMENTS_FILE,
            &self.schemas.movements,
            b',',
            codec::encode_movements(movements),
        )
    }

    fn load_catalog(&self) -> Result<Vec<CatalogEntry>, StorageError> {
        self.load(CATALOG_FILE, &self.schemas.catalog, |path, table| {
            Ok(Decoded::all(codec::decode_catalog(path, table)))
        })
    }

    fn save_catalog(&self, entries: &[CatalogEntry]) -> Result<(), StorageError> {
        self.save(
            CATALOG_FILE,
            &self.schemas.catalog,
            b'\t',
            codec::encode_catalog(entries),
        )
    }

    fn load_vendor_rules(&self) -> Result<Vec<VendorRule>, StorageError> {
        self.load(VENDORS_FILE, &self.schemas.vendors, |path, table| {
            Ok(Decoded::all(codec::decode_vendor_rules(path, table)))
        })
    }

    fn save_vendor_rules(&self, rules: &[VendorRule]) -> Result<(), StorageError> {
        self.save(
            VENDORS_FILE,
            &self.schemas.vendors,
            b',',
            codec::encode_vendor_rules(rules),
        )
    }

    fn load_orders(&self) -> Result<Vec<PurchaseOrder>, StorageError> {
        self.load(ORDERS_FILE, &self.schemas.orders, |path, table| {
            codec::decode_orders(path, table).map(Decoded::all)
        })
    }

    fn save_orders(&self, orders: &[PurchaseOrder]) -> Result<(), StorageError> {
        let rows = codec::encode_orders(&self.path(ORDERS_FILE), orders)?;
        self.save(ORDERS_FILE, &self.schemas.orders, b',', rows)
    }
}
