use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use larder_core::{Branch, DomainError, DomainResult, Entity, OrderId};
use larder_inventory::{InventoryLedger, ItemKey, LogMovement, MovementOutcome, MovementType};

use crate::cart::VendorBatch;

/// Purchase order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Completed,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
        }
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            t if t.eq_ignore_ascii_case("pending") => Ok(OrderStatus::Pending),
            t if t.eq_ignore_ascii_case("completed") => Ok(OrderStatus::Completed),
            other => Err(DomainError::validation(format!(
                "order status must be Pending or Completed, got {other:?}"
            ))),
        }
    }
}

/// Purchase order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(alias = "cat")]
    pub category: String,
    pub item: String,
    pub qty: Decimal,
    #[serde(default)]
    pub unit: String,
}

/// Goods received against one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptOutcome {
    pub order_id: OrderId,
    pub movements: Vec<MovementOutcome>,
}

/// A purchase order sent to one vendor on behalf of one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseOrder {
    id: OrderId,
    date: NaiveDate,
    branch: Branch,
    vendor: String,
    lines: Vec<OrderLine>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl PurchaseOrder {
    /// Turn a vendor batch into a pending order.
    pub fn place(
        id: OrderId,
        batch: &VendorBatch,
        branch: Branch,
        date: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if batch.lines.is_empty() {
            return Err(DomainError::validation("cannot place an order without lines"));
        }

        Ok(Self {
            id,
            date,
            branch,
            vendor: batch.vendor.clone(),
            lines: batch.lines.clone(),
            status: OrderStatus::Pending,
            created_at,
        })
    }

    /// Rehydrate a persisted order.
    pub fn restore(
        id: OrderId,
        date: NaiveDate,
        branch: Branch,
        vendor: String,
        lines: Vec<OrderLine>,
        status: OrderStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            date,
            branch,
            vendor,
            lines,
            status,
            created_at,
        }
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn branch(&self) -> Branch {
        self.branch
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Book the delivered quantities into the ledger and close the order.
    ///
    /// `confirmed` replaces the order's lines (staff may correct quantities on
    /// delivery). Every line with a positive quantity becomes an IN movement at
    /// the order's branch dated `today`; zero lines are kept but not booked.
    /// Lines are validated up front so a bad line books nothing.
    pub fn confirm_receipt(
        &mut self,
        ledger: &mut InventoryLedger,
        confirmed: Vec<OrderLine>,
        today: NaiveDate,
    ) -> DomainResult<ReceiptOutcome> {
        if self.status == OrderStatus::Completed {
            return Err(DomainError::conflict(format!(
                "order {} was already received",
                self.id
            )));
        }

        for line in &confirmed {
            if line.qty < Decimal::ZERO {
                return Err(DomainError::validation(format!(
                    "received quantity for {} cannot be negative",
                    line.item
                )));
            }
            if line.qty > Decimal::ZERO {
                ItemKey::new(self.branch, line.category.as_str(), line.item.as_str()).validate()?;
            }
        }

        let mut movements = Vec::new();
        for line in confirmed.iter().filter(|l| l.qty > Decimal::ZERO) {
            let outcome = ledger.log_movement(LogMovement {
                date: today,
                key: ItemKey::new(self.branch, line.category.as_str(), line.item.as_str()),
                unit: line.unit.clone(),
                movement_type: MovementType::In,
                qty: line.qty,
            })?;
            movements.push(outcome);
        }

        self.lines = confirmed;
        self.status = OrderStatus::Completed;

        Ok(ReceiptOutcome {
            order_id: self.id,
            movements,
        })
    }
}

impl Entity for PurchaseOrder {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// All purchase orders, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBook {
    orders: Vec<PurchaseOrder>,
}

impl OrderBook {
    pub fn from_orders(orders: Vec<PurchaseOrder>) -> Self {
        Self { orders }
    }

    pub fn orders(&self) -> &[PurchaseOrder] {
        &self.orders
    }

    pub fn insert(&mut self, order: PurchaseOrder) {
        self.orders.push(order);
    }

    pub fn get(&self, id: &OrderId) -> Option<&PurchaseOrder> {
        self.orders.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: &OrderId) -> Option<&mut PurchaseOrder> {
        self.orders.iter_mut().find(|o| o.id() == id)
    }

    /// Newest first, as the order status board shows them.
    pub fn newest_first(&self) -> Vec<&PurchaseOrder> {
        let mut out: Vec<&PurchaseOrder> = self.orders.iter().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    /// Confirm receipt of `id`; see [`PurchaseOrder::confirm_receipt`].
    pub fn confirm_receipt(
        &mut self,
        id: &OrderId,
        ledger: &mut InventoryLedger,
        confirmed: Vec<OrderLine>,
        today: NaiveDate,
    ) -> DomainResult<ReceiptOutcome> {
        let order = self.get_mut(id).ok_or_else(DomainError::not_found)?;
        order.confirm_receipt(ledger, confirmed, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use larder_inventory::RegisterItem;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn line(category: &str, item: &str, qty: i64) -> OrderLine {
        OrderLine {
            category: category.to_string(),
            item: item.to_string(),
            qty: Decimal::from(qty),
            unit: "kg".to_string(),
        }
    }

    fn batch() -> VendorBatch {
        VendorBatch {
            vendor: "Seoul Meats".to_string(),
            phone: "010-3333-4444".to_string(),
            lines: vec![line("Meat", "Chicken", 5), line("Meat", "Beef", 2)],
        }
    }

    fn pending_order(created_hour: u32) -> PurchaseOrder {
        PurchaseOrder::place(
            OrderId::new(),
            &batch(),
            Branch::Dongtan,
            day(1),
            Utc.with_ymd_and_hms(2024, 7, 1, created_hour, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn placing_requires_lines() {
        let empty = VendorBatch {
            lines: Vec::new(),
            ..batch()
        };
        let err = PurchaseOrder::place(OrderId::new(), &empty, Branch::Dongtan, day(1), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn receipt_books_in_movements_and_completes() {
        let mut ledger = InventoryLedger::default();
        ledger
            .register(RegisterItem {
                key: ItemKey::new(Branch::Dongtan, "Meat", "Chicken"),
                unit: "kg".to_string(),
                qty: Decimal::from(1),
                min_qty: Decimal::ZERO,
                note: String::new(),
                date: day(1),
            })
            .unwrap();

        let mut order = pending_order(9);
        let confirmed = vec![line("Meat", "Chicken", 4), line("Meat", "Beef", 0)];
        let receipt = order
            .confirm_receipt(&mut ledger, confirmed.clone(), day(3))
            .unwrap();

        assert_eq!(receipt.movements.len(), 1);
        assert_eq!(order.status(), OrderStatus::Completed);
        assert_eq!(order.lines(), confirmed.as_slice());

        let chicken = ledger
            .get(&ItemKey::new(Branch::Dongtan, "Meat", "Chicken"))
            .unwrap();
        assert_eq!(chicken.current_qty, Decimal::from(5));
        assert_eq!(chicken.last_updated, Some(day(3)));
        assert!(ledger
            .get(&ItemKey::new(Branch::Dongtan, "Meat", "Beef"))
            .is_none());
        assert_eq!(ledger.movements().len(), 1);
        assert_eq!(ledger.movements()[0].movement_type, MovementType::In);
    }

    #[test]
    fn receipt_creates_rows_for_new_items() {
        let mut ledger = InventoryLedger::default();
        let mut order = pending_order(9);
        order
            .confirm_receipt(&mut ledger, batch().lines, day(2))
            .unwrap();
        assert_eq!(ledger.records().len(), 2);
    }

    #[test]
    fn second_receipt_is_a_conflict() {
        let mut ledger = InventoryLedger::default();
        let mut order = pending_order(9);
        order
            .confirm_receipt(&mut ledger, batch().lines, day(2))
            .unwrap();
        let before = ledger.clone();

        let err = order
            .confirm_receipt(&mut ledger, batch().lines, day(2))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(ledger, before);
    }

    #[test]
    fn bad_line_books_nothing() {
        let mut ledger = InventoryLedger::default();
        let mut order = pending_order(9);
        let confirmed = vec![line("Meat", "Chicken", 4), line("Meat", "", 2)];
        assert!(order.confirm_receipt(&mut ledger, confirmed, day(2)).is_err());
        assert!(ledger.movements().is_empty());
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn order_book_lists_newest_first_and_reports_unknown_ids() {
        let mut book = OrderBook::default();
        let early = pending_order(8);
        let late = pending_order(17);
        let late_id = late.id_typed();
        book.insert(early);
        book.insert(late);

        assert_eq!(book.newest_first()[0].id_typed(), late_id);

        let mut ledger = InventoryLedger::default();
        let err = book
            .confirm_receipt(&OrderId::new(), &mut ledger, Vec::new(), day(2))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn order_lines_read_the_short_category_key() {
        let parsed: Vec<OrderLine> =
            serde_json::from_str(r#"[{"cat":"Meat","item":"Chicken","qty":5,"unit":"kg"}]"#)
                .unwrap();
        assert_eq!(parsed[0].category, "Meat");
        assert_eq!(parsed[0].qty, Decimal::from(5));
    }
}
