//! Transactional front door over the ledger, catalog and purchasing tables.
//!
//! Every operation runs the same pipeline while holding one process-wide lock:
//!
//! ```text
//! request
//!   ↓
//! 1. Load the tables it touches from the repository
//!   ↓
//! 2. Rebuild the domain object (ledger, catalog, order book)
//!   ↓
//! 3. Apply the operation (pure domain logic)
//!   ↓
//! 4. Save the changed tables (whole-table rewrite)
//! ```
//!
//! Two requests in one process can therefore never interleave their
//! load/save steps. Writers in other processes are not coordinated.
//!
//! When an operation touches several tables they are saved one after another:
//! movement log first, then the snapshot, then the order book. A storage failure
//! part way through leaves the earlier tables written.

use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use larder_core::{Branch, DomainError, OrderId};
use larder_inventory::{
    CatalogEntry, DeleteOutcome, FilterOptions, InventoryFilter, InventoryLedger, InventoryRecord,
    ItemCatalog, ItemKey, LogMovement, MovementOutcome, MovementRecord, NegativeStockPolicy,
    RegisterItem, RegisterOutcome, UsagePeriod, UsageSummary,
};
use larder_purchasing::{
    group_cart_by_vendor, CartLine, OrderBook, OrderLine, PurchaseOrder, ReceiptOutcome,
    VendorContact, VendorDirectory,
};

use crate::export::{self, ExportError};
use crate::repository::Repository;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// A newly placed order and the request text to send its vendor.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PlacedOrder {
    pub order: PurchaseOrder,
    pub phone: String,
    pub message: String,
}

pub struct LarderService<R> {
    repo: R,
    policy: NegativeStockPolicy,
    lock: Mutex<()>,
}

impl<R: Repository> LarderService<R> {
    pub fn new(repo: R, policy: NegativeStockPolicy) -> Self {
        Self {
            repo,
            policy,
            lock: Mutex::new(()),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn policy(&self) -> NegativeStockPolicy {
        self.policy
    }

    fn transaction<T>(&self, f: impl FnOnce() -> ServiceResult<T>) -> ServiceResult<T> {
        // The guard protects no data, so a panic in another request leaves nothing inconsistent.
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f()
    }

    fn load_ledger(&self) -> ServiceResult<InventoryLedger> {
        let records = self.repo.load_inventory()?;
        let movements = self.repo.load_movements()?;
        let (ledger, duplicates) = InventoryLedger::from_parts(records, movements, self.policy);
        for key in duplicates {
            warn!(item = %key, "duplicate inventory row ignored; first one kept");
        }
        debug!(
            records = ledger.records().len(),
            movements = ledger.movements().len(),
            "ledger loaded"
        );
        Ok(ledger)
    }

    fn load_catalog(&self) -> ServiceResult<ItemCatalog> {
        Ok(ItemCatalog::from_entries(self.repo.load_catalog()?))
    }

    fn load_vendors(&self) -> ServiceResult<VendorDirectory> {
        Ok(VendorDirectory::from_rules(self.repo.load_vendor_rules()?))
    }

    fn save_ledger(&self, ledger: &InventoryLedger) -> ServiceResult<()> {
        self.repo.save_movements(ledger.movements())?;
        self.repo.save_inventory(ledger.records())?;
        Ok(())
    }

    // --- Inventory ledger -------------------------------------------------

    /// Register a new row or overwrite the existing one for the same key.
    pub fn register_item(&self, cmd: RegisterItem) -> ServiceResult<RegisterOutcome> {
        self.transaction(|| {
            let mut ledger = self.load_ledger()?;
            let key = cmd.key.clone();
            let outcome = ledger.register(cmd)?;
            self.repo.save_inventory(ledger.records())?;
            info!(item = %key, ?outcome, "inventory row registered");
            Ok(outcome)
        })
    }

    pub fn delete_item(&self, key: &ItemKey) -> ServiceResult<DeleteOutcome> {
        self.transaction(|| {
            let mut ledger = self.load_ledger()?;
            let outcome = ledger.delete(key);
            match &outcome {
                DeleteOutcome::Deleted(_) => {
                    self.repo.save_inventory(ledger.records())?;
                    info!(item = %key, "inventory row deleted");
                }
                DeleteOutcome::NotFound => warn!(item = %key, "nothing to delete"),
            }
            Ok(outcome)
        })
    }

    pub fn log_movement(&self, cmd: LogMovement) -> ServiceResult<MovementOutcome> {
        self.transaction(|| {
            let mut ledger = self.load_ledger()?;
            let key = cmd.key.clone();
            let movement_type = cmd.movement_type;
            let qty = cmd.qty;
            let outcome = ledger.log_movement(cmd)?;

            if outcome.is_applied() {
                self.save_ledger(&ledger)?;
                info!(item = %key, %movement_type, %qty, "movement logged");
            }
            if let Some(warning) = outcome.warning() {
                warn!(item = %key, %warning, applied = outcome.is_applied(), "movement warning");
            }
            Ok(outcome)
        })
    }

    pub fn query(&self, filter: &InventoryFilter) -> ServiceResult<Vec<InventoryRecord>> {
        self.transaction(|| {
            let ledger = self.load_ledger()?;
            Ok(ledger.query(filter).into_iter().cloned().collect())
        })
    }

    /// Cascading filter choices: categories narrowed by branch, items by both.
    pub fn filter_options(
        &self,
        branch: Option<Branch>,
        category: Option<&str>,
    ) -> ServiceResult<FilterOptions> {
        self.transaction(|| {
            let ledger = self.load_ledger()?;
            let category = category.filter(|c| !c.trim().is_empty());
            Ok(FilterOptions {
                categories: ledger.categories(branch),
                items: ledger.items(branch, category),
            })
        })
    }

    pub fn movements(&self) -> ServiceResult<Vec<MovementRecord>> {
        self.transaction(|| Ok(self.repo.load_movements()?))
    }

    pub fn usage_summary(&self, period: &UsagePeriod) -> ServiceResult<UsageSummary> {
        self.transaction(|| Ok(self.load_ledger()?.usage_summary(period)?))
    }

    // --- Item catalog -----------------------------------------------------

    pub fn catalog(&self) -> ServiceResult<ItemCatalog> {
        self.transaction(|| self.load_catalog())
    }

    /// Returns `true` when the entry is new.
    pub fn upsert_catalog_entry(&self, entry: CatalogEntry) -> ServiceResult<bool> {
        self.transaction(|| {
            let mut catalog = self.load_catalog()?;
            let label = format!("{}/{}", entry.category.trim(), entry.item.trim());
            let created = catalog.upsert(entry)?;
            self.repo.save_catalog(catalog.entries())?;
            info!(entry = %label, created, "catalog entry saved");
            Ok(created)
        })
    }

    /// Returns `true` when something was removed.
    pub fn remove_catalog_entry(&self, category: &str, item: &str) -> ServiceResult<bool> {
        self.transaction(|| {
            let mut catalog = self.load_catalog()?;
            let removed = catalog.remove(category.trim(), item.trim());
            if removed {
                self.repo.save_catalog(catalog.entries())?;
                info!(category, item, "catalog entry removed");
            } else {
                warn!(category, item, "catalog entry not found");
            }
            Ok(removed)
        })
    }

    // --- Purchasing -------------------------------------------------------

    pub fn vendor_for(&self, category: &str, item: &str) -> ServiceResult<VendorContact> {
        self.transaction(|| Ok(self.load_vendors()?.lookup(category.trim(), item.trim())))
    }

    /// Split a cart per vendor and place one pending order for each.
    pub fn place_orders(
        &self,
        branch: Branch,
        date: NaiveDate,
        cart: &[CartLine],
    ) -> ServiceResult<Vec<PlacedOrder>> {
        self.transaction(|| {
            let vendors = self.load_vendors()?;
            let catalog = self.load_catalog()?;
            let batches = group_cart_by_vendor(cart, &vendors, &catalog);
            if batches.is_empty() {
                return Err(DomainError::validation("cart has no line with a positive quantity").into());
            }

            let mut book = OrderBook::from_orders(self.repo.load_orders()?);
            let created_at = Utc::now();
            let mut placed = Vec::with_capacity(batches.len());
            for batch in &batches {
                let order = PurchaseOrder::place(OrderId::new(), batch, branch, date, created_at)?;
                placed.push(PlacedOrder {
                    message: batch.request_message(branch, date),
                    phone: batch.phone.clone(),
                    order: order.clone(),
                });
                book.insert(order);
            }

            self.repo.save_orders(book.orders())?;
            info!(%branch, orders = placed.len(), "purchase orders placed");
            Ok(placed)
        })
    }

    /// Order book, newest first.
    pub fn orders(&self) -> ServiceResult<Vec<PurchaseOrder>> {
        self.transaction(|| {
            let book = OrderBook::from_orders(self.repo.load_orders()?);
            Ok(book.newest_first().into_iter().cloned().collect())
        })
    }

    /// Book delivered goods as IN movements dated `today` and close the order.
    pub fn confirm_receipt(
        &self,
        id: &OrderId,
        confirmed: Vec<OrderLine>,
        today: NaiveDate,
    ) -> ServiceResult<ReceiptOutcome> {
        self.transaction(|| {
            let mut ledger = self.load_ledger()?;
            let mut book = OrderBook::from_orders(self.repo.load_orders()?);

            let receipt = match book.confirm_receipt(id, &mut ledger, confirmed, today) {
                Ok(receipt) => receipt,
                Err(err) => {
                    warn!(order = %id, error = %err, "receipt not confirmed");
                    return Err(err.into());
                }
            };

            self.save_ledger(&ledger)?;
            self.repo.save_orders(book.orders())?;
            info!(order = %id, lines = receipt.movements.len(), "goods received");
            Ok(receipt)
        })
    }

    // --- Exports ----------------------------------------------------------

    pub fn inventory_print(&self, filter: &InventoryFilter) -> ServiceResult<String> {
        let rows = self.query(filter)?;
        let title = match filter.branch {
            Some(branch) => format!("Inventory · {branch}"),
            None => "Inventory".to_string(),
        };
        Ok(export::inventory_html(&title, rows.iter()))
    }

    pub fn usage_csv(&self, period: &UsagePeriod) -> ServiceResult<String> {
        Ok(export::usage_csv(&self.usage_summary(period)?)?)
    }

    pub fn movements_csv(&self) -> ServiceResult<String> {
        Ok(export::movements_csv(self.movements()?.iter())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{CsvRepository, InMemoryRepository};
    use larder_inventory::{MovementType, StockWarning};
    use larder_purchasing::{OrderStatus, VendorRule};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    fn onion() -> ItemKey {
        ItemKey::new(Branch::Dongdaemun, "Vegetable", "Onion")
    }

    fn register(qty: i64, min: i64) -> RegisterItem {
        RegisterItem {
            key: onion(),
            unit: "kg".to_string(),
            qty: Decimal::from(qty),
            min_qty: Decimal::from(min),
            note: String::new(),
            date: day(1),
        }
    }

    fn movement(movement_type: MovementType, qty: i64) -> LogMovement {
        LogMovement {
            date: day(2),
            key: onion(),
            unit: "kg".to_string(),
            movement_type,
            qty: Decimal::from(qty),
        }
    }

    fn service() -> LarderService<InMemoryRepository> {
        LarderService::new(InMemoryRepository::new(), NegativeStockPolicy::Allow)
    }

    #[test]
    fn onion_round_trip_goes_negative_with_a_warning() {
        let svc = service();
        assert_eq!(svc.register_item(register(10, 2)).unwrap(), RegisterOutcome::Created);

        let rows = svc
            .query(&InventoryFilter {
                branch: Some(Branch::Dongdaemun),
                ..InventoryFilter::default()
            })
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].current_qty, Decimal::from(10));

        let out = svc.log_movement(movement(MovementType::Out, 4)).unwrap();
        assert!(out.warning().is_none());

        let out = svc.log_movement(movement(MovementType::Out, 100)).unwrap();
        assert!(out.is_applied());
        assert!(matches!(
            out.warning(),
            Some(StockWarning::NegativeStock { quantity, .. }) if *quantity == Decimal::from(-94)
        ));

        let stored = svc.repository().load_inventory().unwrap();
        assert_eq!(stored[0].current_qty, Decimal::from(-94));
        assert_eq!(svc.movements().unwrap().len(), 2);
    }

    #[test]
    fn reject_policy_leaves_tables_untouched() {
        let svc = LarderService::new(InMemoryRepository::new(), NegativeStockPolicy::Reject);
        svc.register_item(register(3, 0)).unwrap();

        let out = svc.log_movement(movement(MovementType::Out, 5)).unwrap();
        assert!(!out.is_applied());
        assert_eq!(svc.repository().load_inventory().unwrap()[0].current_qty, Decimal::from(3));
        assert!(svc.movements().unwrap().is_empty());
    }

    #[test]
    fn deleting_a_missing_row_reports_not_found() {
        let svc = service();
        svc.register_item(register(1, 0)).unwrap();
        let other = ItemKey::new(Branch::Dongdaemun, "Vegetable", "Leek");
        assert_eq!(svc.delete_item(&other).unwrap(), DeleteOutcome::NotFound);
        assert_eq!(svc.repository().load_inventory().unwrap().len(), 1);
        assert!(matches!(svc.delete_item(&onion()).unwrap(), DeleteOutcome::Deleted(_)));
        assert!(svc.repository().load_inventory().unwrap().is_empty());
    }

    #[test]
    fn filter_options_cascade() {
        let svc = service();
        svc.register_item(register(1, 0)).unwrap();
        svc.register_item(RegisterItem {
            key: ItemKey::new(Branch::Yangjae, "Meat", "Chicken"),
            ..register(1, 0)
        })
        .unwrap();

        let all = svc.filter_options(None, None).unwrap();
        assert_eq!(all.categories, vec!["Meat".to_string(), "Vegetable".to_string()]);

        let yangjae = svc.filter_options(Some(Branch::Yangjae), Some("")).unwrap();
        assert_eq!(yangjae.categories, vec!["Meat".to_string()]);
        assert_eq!(yangjae.items, vec!["Chicken".to_string()]);
    }

    #[test]
    fn usage_csv_counts_only_out_movements() {
        let svc = service();
        svc.register_item(register(10, 0)).unwrap();
        svc.log_movement(movement(MovementType::Out, 3)).unwrap();
        svc.log_movement(movement(MovementType::In, 50)).unwrap();

        let summary = svc.usage_summary(&UsagePeriod::month(2024, 4)).unwrap();
        assert_eq!(summary.total, Decimal::from(3));
        assert!(svc.usage_csv(&UsagePeriod::month(2024, 4)).unwrap().contains(",3"));
        assert!(svc.usage_summary(&UsagePeriod::month(2024, 13)).is_err());
    }

    fn purchasing_repo() -> InMemoryRepository {
        InMemoryRepository::new()
            .with_catalog(vec![CatalogEntry::new("Meat", "Chicken", "kg")])
            .with_vendor_rules(vec![VendorRule {
                category: "Meat".to_string(),
                item: String::new(),
                vendor: "Seoul Meats".to_string(),
                phone: "010-3333-4444".to_string(),
            }])
    }

    #[test]
    fn orders_flow_from_cart_to_receipt() {
        let svc = LarderService::new(purchasing_repo(), NegativeStockPolicy::Allow);
        let cart = vec![
            CartLine {
                category: "Meat".to_string(),
                item: "Chicken".to_string(),
                qty: Decimal::from(5),
            },
            CartLine {
                category: "Spice".to_string(),
                item: "Salt".to_string(),
                qty: Decimal::from(1),
            },
        ];

        let placed = svc.place_orders(Branch::Dongtan, day(5), &cart).unwrap();
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].order.vendor(), "Seoul Meats");
        assert!(placed[0].message.contains("- Chicken 5 kg"));
        assert_eq!(placed[1].order.vendor(), "Unknown");

        let id = placed[0].order.id_typed();
        let lines = placed[0].order.lines().to_vec();
        let receipt = svc.confirm_receipt(&id, lines.clone(), day(7)).unwrap();
        assert_eq!(receipt.movements.len(), 1);

        let chicken = ItemKey::new(Branch::Dongtan, "Meat", "Chicken");
        let stock = svc.repository().load_inventory().unwrap();
        let row = stock.iter().find(|r| r.key == chicken).unwrap();
        assert_eq!(row.current_qty, Decimal::from(5));
        assert_eq!(row.last_updated, Some(day(7)));

        let orders = svc.orders().unwrap();
        let confirmed = orders.iter().find(|o| o.id_typed() == id).unwrap();
        assert_eq!(confirmed.status(), OrderStatus::Completed);

        let err = svc.confirm_receipt(&id, lines, day(8)).unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Conflict(_))));

        let err = svc.confirm_receipt(&OrderId::new(), Vec::new(), day(8)).unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound)));
    }

    #[test]
    fn empty_cart_is_rejected() {
        let svc = LarderService::new(purchasing_repo(), NegativeStockPolicy::Allow);
        let err = svc.place_orders(Branch::Dongtan, day(5), &[]).unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
        assert!(svc.orders().unwrap().is_empty());
    }

    #[test]
    fn catalog_edits_persist() {
        let svc = service();
        assert!(svc.upsert_catalog_entry(CatalogEntry::new("Vegetable", "Onion", "kg")).unwrap());
        assert!(!svc.upsert_catalog_entry(CatalogEntry::new("Vegetable", "Onion", "box")).unwrap());
        assert_eq!(svc.catalog().unwrap().unit_for_item("Vegetable", "Onion"), "box");
        assert!(svc.remove_catalog_entry("Vegetable", "Onion").unwrap());
        assert!(!svc.remove_catalog_entry("Vegetable", "Onion").unwrap());
        assert!(svc.upsert_catalog_entry(CatalogEntry::new("", "Onion", "kg")).is_err());
    }

    #[test]
    fn concurrent_movements_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let svc = Arc::new(LarderService::new(
            CsvRepository::new(dir.path()),
            NegativeStockPolicy::Allow,
        ));
        svc.register_item(register(0, 0)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let svc = Arc::clone(&svc);
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        svc.log_movement(movement(MovementType::In, 1)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let rows = svc.query(&InventoryFilter::default()).unwrap();
        assert_eq!(rows[0].current_qty, Decimal::from(40));
        assert_eq!(svc.movements().unwrap().len(), 40);
    }

    #[test]
    fn corrupt_files_surface_as_storage_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(crate::repository::INVENTORY_FILE), [0xFF, 0x00, 0xC3]).unwrap();
        let svc = LarderService::new(CsvRepository::new(dir.path()), NegativeStockPolicy::Allow);
        let err = svc.query(&InventoryFilter::default()).unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    #[test]
    fn rows_without_an_item_do_not_hide_the_rest_of_the_ledger() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(crate::repository::INVENTORY_FILE),
            "Branch,Item,Category,Unit,CurrentQty,MinQty,Note,Date\n동대문,Onion,Vegetable,kg,10,2,,\n동대문,,Vegetable,kg,0,0,,\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(crate::repository::MOVEMENTS_FILE),
            "Date,Branch,Category,Item,Unit,Type,Qty\n2024-04-02,동대문,Vegetable,,kg,OUT,7\n2024-04-02,동대문,Vegetable,Onion,kg,OUT,3\n",
        )
        .unwrap();
        let svc = LarderService::new(CsvRepository::new(dir.path()), NegativeStockPolicy::Allow);

        let rows = svc.query(&InventoryFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, onion());

        let options = svc.filter_options(Some(Branch::Dongdaemun), Some("Vegetable")).unwrap();
        assert_eq!(options.items, vec!["Onion".to_string()]);

        let usage = svc.usage_summary(&UsagePeriod::month(2024, 4)).unwrap();
        assert_eq!(usage.total, Decimal::from(3));

        svc.log_movement(movement(MovementType::In, 1)).unwrap();
        let reloaded = CsvRepository::new(dir.path()).load_inventory().unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].current_qty, Decimal::from(11));
    }
}
