//! Row ⇄ domain conversions for each table.

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use larder_core::{Branch, OrderId};
use larder_inventory::{CatalogEntry, InventoryRecord, ItemKey, MovementRecord, MovementType};
use larder_purchasing::{OrderLine, OrderStatus, PurchaseOrder, VendorRule};

use super::table::{RawRow, Table};
use super::StorageError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Typed access to the cells of one row, with errors pointing at file/line/column.
struct Row<'a> {
    path: &'a Path,
    table: &'a Table,
    raw: &'a RawRow,
}

impl<'a> Row<'a> {
    fn text(&self, column: &'static str) -> &'a str {
        self.table.cell(self.raw, column)
    }

    fn invalid(&self, column: &'static str, reason: impl ToString) -> StorageError {
        StorageError::InvalidValue {
            path: self.path.to_path_buf(),
            line: self.raw.line,
            column,
            value: self.text(column).to_string(),
            reason: reason.to_string(),
        }
    }

    fn branch(&self, column: &'static str) -> Result<Branch, StorageError> {
        Branch::from_str(self.text(column)).map_err(|e| self.invalid(column, e))
    }

    /// Empty cells read as zero.
    fn decimal(&self, column: &'static str) -> Result<Decimal, StorageError> {
        let raw = self.text(column);
        if raw.is_empty() {
            return Ok(Decimal::ZERO);
        }
        Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map_err(|e| self.invalid(column, e))
    }

    fn optional_date(&self, column: &'static str) -> Result<Option<NaiveDate>, StorageError> {
        match self.text(column) {
            "" => Ok(None),
            v => parse_date(v).map(Some).ok_or_else(|| {
                self.invalid(column, format!("expected a date like {DATE_FORMAT}"))
            }),
        }
    }

    fn date(&self, column: &'static str) -> Result<NaiveDate, StorageError> {
        self.optional_date(column)?
            .ok_or_else(|| self.invalid(column, "must not be empty"))
    }
}

/// `YYYY-MM-DD`, or a datetime whose first ten characters are one.
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| {
            value
                .get(..10)
                .and_then(|head| NaiveDate::parse_from_str(head, DATE_FORMAT).ok())
        })
}

fn parse_created(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, CREATED_FORMAT)
                .ok()
                .map(|naive| naive.and_utc())
        })
        .or_else(|| parse_date(value).and_then(|d| d.and_hms_opt(0, 0, 0)).map(|n| n.and_utc()))
}

/// Decoded rows plus the lines of rows skipped for having no item name.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub rows: Vec<T>,
    pub skipped: Vec<u64>,
}

impl<T> Decoded<T> {
    pub fn all(rows: Vec<T>) -> Self {
        Self {
            rows,
            skipped: Vec::new(),
        }
    }
}

/// Decode every row that names an item; rows with a blank item are left out.
fn decode_items<'a, T>(
    path: &'a Path,
    table: &'a Table,
    decode: impl Fn(&Row<'a>, &'a str) -> Result<T, StorageError>,
) -> Result<Decoded<T>, StorageError> {
    let mut decoded = Decoded::all(Vec::with_capacity(table.rows.len()));
    for row in rows(path, table) {
        match row.text("Item") {
            "" => decoded.skipped.push(row.raw.line),
            item => decoded.rows.push(decode(&row, item)?),
        }
    }
    Ok(decoded)
}

fn rows<'a>(path: &'a Path, table: &'a Table) -> impl Iterator<Item = Row<'a>> {
    table.rows.iter().map(move |raw| Row { path, table, raw })
}

fn quantity(value: Decimal) -> String {
    value.normalize().to_string()
}

pub fn decode_inventory(
    path: &Path,
    table: &Table,
) -> Result<Decoded<InventoryRecord>, StorageError> {
    decode_items(path, table, |row, item| {
        Ok(InventoryRecord {
            key: ItemKey::new(row.branch("Branch")?, row.text("Category"), item),
            unit: row.text("Unit").to_string(),
            current_qty: row.decimal("CurrentQty")?,
            min_qty: row.decimal("MinQty")?,
            note: row.text("Note").to_string(),
            last_updated: row.optional_date("Date")?,
        })
    })
}

pub fn encode_inventory(records: &[InventoryRecord]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|r| {
            vec![
                r.key.branch.name().to_string(),
                r.key.item.clone(),
                r.key.category.clone(),
                r.unit.clone(),
                quantity(r.current_qty),
                quantity(r.min_qty),
                r.note.clone(),
                r.last_updated
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect()
}

pub fn decode_movements(
    path: &Path,
    table: &Table,
) -> Result<Decoded<MovementRecord>, StorageError> {
    decode_items(path, table, |row, item| {
        let movement_type =
            MovementType::from_str(row.text("Type")).map_err(|e| row.invalid("Type", e))?;
        Ok(MovementRecord {
            date: row.date("Date")?,
            key: ItemKey::new(row.branch("Branch")?, row.text("Category"), item),
            unit: row.text("Unit").to_string(),
            movement_type,
            qty: row.decimal("Qty")?,
        })
    })
}

pub fn encode_movements(movements: &[MovementRecord]) -> Vec<Vec<String>> {
    movements
        .iter()
        .map(|m| {
            vec![
                m.date.format(DATE_FORMAT).to_string(),
                m.key.branch.name().to_string(),
                m.key.category.clone(),
                m.key.item.clone(),
                m.unit.clone(),
                m.movement_type.as_str().to_string(),
                quantity(m.qty),
            ]
        })
        .collect()
}

/// Catalog rows never fail: blank and header-like rows are filtered by the catalog.
pub fn decode_catalog(path: &Path, table: &Table) -> Vec<CatalogEntry> {
    rows(path, table)
        .map(|row| CatalogEntry::new(row.text("Category"), row.text("Item"), row.text("Unit")))
        .collect()
}

pub fn encode_catalog(entries: &[CatalogEntry]) -> Vec<Vec<String>> {
    entries
        .iter()
        .map(|e| vec![e.category.clone(), e.item.clone(), e.unit.clone()])
        .collect()
}

pub fn decode_vendor_rules(path: &Path, table: &Table) -> Vec<VendorRule> {
    rows(path, table)
        .map(|row| VendorRule {
            category: row.text("Category").to_string(),
            item: row.text("Item").to_string(),
            vendor: row.text("Vendor").to_string(),
            phone: row.text("Phone").to_string(),
        })
        .collect()
}

pub fn encode_vendor_rules(rules: &[VendorRule]) -> Vec<Vec<String>> {
    rules
        .iter()
        .map(|r| {
            vec![
                r.category.clone(),
                r.item.clone(),
                r.vendor.clone(),
                r.phone.clone(),
            ]
        })
        .collect()
}

pub fn decode_orders(path: &Path, table: &Table) -> Result<Vec<PurchaseOrder>, StorageError> {
    rows(path, table)
        .map(|row| -> Result<PurchaseOrder, StorageError> {
            let id = OrderId::from_str(row.text("OrderId")).map_err(|e| row.invalid("OrderId", e))?;
            let lines: Vec<OrderLine> = match row.text("Items") {
                "" => Vec::new(),
                json => serde_json::from_str(json).map_err(|e| row.invalid("Items", e))?,
            };
            let status =
                OrderStatus::from_str(row.text("Status")).map_err(|e| row.invalid("Status", e))?;
            let created_at = parse_created(row.text("CreatedDate"))
                .ok_or_else(|| row.invalid("CreatedDate", "expected an RFC 3339 timestamp"))?;

            Ok(PurchaseOrder::restore(
                id,
                row.date("Date")?,
                row.branch("Branch")?,
                row.text("Vendor").to_string(),
                lines,
                status,
                created_at,
            ))
        })
        .collect()
}

pub fn encode_orders(path: &Path, orders: &[PurchaseOrder]) -> Result<Vec<Vec<String>>, StorageError> {
    orders
        .iter()
        .map(|o| -> Result<Vec<String>, StorageError> {
            let items = serde_json::to_string(o.lines()).map_err(|e| StorageError::Encode {
                path: path.to_path_buf(),
                column: "Items",
                reason: e.to_string(),
            })?;
            Ok(vec![
                o.id_typed().to_string(),
                o.date().format(DATE_FORMAT).to_string(),
                o.branch().name().to_string(),
                o.vendor().to_string(),
                items,
                o.status().as_str().to_string(),
                o.created_at().to_rfc3339(),
            ])
        })
        .collect()
}
