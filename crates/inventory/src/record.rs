use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use larder_core::{Branch, DomainError, Entity};

/// Identity of a snapshot row: one item of one category at one branch.
///
/// Labels are trimmed on construction so that `"Onion "` and `"Onion"` name the
/// same row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub branch: Branch,
    pub category: String,
    pub item: String,
}

impl ItemKey {
    pub fn new(branch: Branch, category: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            branch,
            category: category.into().trim().to_string(),
            item: item.into().trim().to_string(),
        }
    }

    /// Both labels must be present for a key to address anything.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.item.trim().is_empty() {
            return Err(DomainError::validation("item name cannot be empty"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }
        Ok(())
    }
}

impl core::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}/{}", self.branch, self.category, self.item)
    }
}

/// Current-state row of the inventory snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    #[serde(flatten)]
    pub key: ItemKey,
    pub unit: String,
    pub current_qty: Decimal,
    pub min_qty: Decimal,
    pub note: String,
    pub last_updated: Option<NaiveDate>,
}

impl InventoryRecord {
    /// Low stock is only meaningful when a threshold has been set.
    pub fn is_low_stock(&self) -> bool {
        self.min_qty > Decimal::ZERO && self.current_qty <= self.min_qty
    }
}

impl Entity for InventoryRecord {
    type Id = ItemKey;

    fn id(&self) -> &Self::Id {
        &self.key
    }
}

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    /// Received stock.
    #[serde(rename = "IN")]
    In,
    /// Consumed or sold stock.
    #[serde(rename = "OUT")]
    Out,
}

impl MovementType {
    pub fn as_str(self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
        }
    }

    /// Signed delta this movement applies to the snapshot.
    pub fn signed(self, qty: Decimal) -> Decimal {
        match self {
            MovementType::In => qty,
            MovementType::Out => -qty,
        }
    }
}

impl core::fmt::Display for MovementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for MovementType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            t if t.eq_ignore_ascii_case("in") || t == "입고" => Ok(MovementType::In),
            t if t.eq_ignore_ascii_case("out") || t == "출고" => Ok(MovementType::Out),
            other => Err(DomainError::validation(format!(
                "movement type must be IN or OUT, got {other:?}"
            ))),
        }
    }
}

/// One entry of the append-only movement log. Never edited once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub key: ItemKey,
    pub unit: String,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub qty: Decimal,
}

impl MovementRecord {
    pub fn signed_qty(&self) -> Decimal {
        self.movement_type.signed(self.qty)
    }
}
