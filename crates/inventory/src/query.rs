use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use larder_core::Branch;

use crate::record::InventoryRecord;

/// Snapshot filter. Every supplied field must match exactly; unset fields match all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryFilter {
    pub branch: Option<Branch>,
    pub category: Option<String>,
    pub item: Option<String>,
    /// Matches the row's last-updated date.
    pub date: Option<NaiveDate>,
    /// Only rows with `current_qty <= min_qty` and a positive `min_qty`.
    #[serde(default, alias = "low_stock")]
    pub low_stock_only: bool,
}

impl InventoryFilter {
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        if self.branch.is_some_and(|b| record.key.branch != b) {
            return false;
        }
        if matches!(&self.category, Some(c) if !c.is_empty() && record.key.category != *c) {
            return false;
        }
        if matches!(&self.item, Some(i) if !i.is_empty() && record.key.item != *i) {
            return false;
        }
        if self.date.is_some() && record.last_updated != self.date {
            return false;
        }
        if self.low_stock_only && !record.is_low_stock() {
            return false;
        }
        true
    }
}

/// Choices offered by the top-down filter: categories for the picked branch,
/// items for the picked branch + category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub items: Vec<String>,
}
