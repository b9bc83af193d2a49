//! Monthly usage report over the movement log.

use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use larder_core::{Branch, DomainError, DomainResult};

use crate::record::{ItemKey, MovementRecord, MovementType};

/// Month to report on, optionally narrowed to one branch and/or category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsagePeriod {
    pub year: i32,
    pub month: u32,
    pub branch: Option<Branch>,
    pub category: Option<String>,
}

impl UsagePeriod {
    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            branch: None,
            category: None,
        }
    }

    fn contains(&self, m: &MovementRecord) -> bool {
        m.date.year() == self.year
            && m.date.month() == self.month
            && self.branch.is_none_or(|b| m.key.branch == b)
            && self
                .category
                .as_deref()
                .is_none_or(|c| c.is_empty() || m.key.category == c)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemUsage {
    pub branch: Branch,
    pub category: String,
    pub item: String,
    pub unit: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryUsage {
    pub branch: Branch,
    pub category: String,
    pub total: Decimal,
}

/// OUT quantities for one month, per item and per category, largest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
    pub period: UsagePeriod,
    pub items: Vec<ItemUsage>,
    pub categories: Vec<CategoryUsage>,
    pub total: Decimal,
}

pub(crate) fn summarize(
    movements: &[MovementRecord],
    period: &UsagePeriod,
) -> DomainResult<UsageSummary> {
    if !(1..=12).contains(&period.month) {
        return Err(DomainError::validation(format!(
            "month must be within 1..=12, got {}",
            period.month
        )));
    }

    // BTreeMap iteration gives the key order used to break ties.
    let mut by_item: BTreeMap<&ItemKey, (&str, Decimal)> = BTreeMap::new();
    let mut by_category: BTreeMap<(Branch, &str), Decimal> = BTreeMap::new();

    for m in movements
        .iter()
        .filter(|m| m.movement_type == MovementType::Out)
        .filter(|m| period.contains(m))
    {
        let entry = by_item.entry(&m.key).or_insert((m.unit.as_str(), Decimal::ZERO));
        entry.1 += m.qty;
        *by_category
            .entry((m.key.branch, m.key.category.as_str()))
            .or_insert(Decimal::ZERO) += m.qty;
    }

    let mut items: Vec<ItemUsage> = by_item
        .into_iter()
        .map(|(key, (unit, total))| ItemUsage {
            branch: key.branch,
            category: key.category.clone(),
            item: key.item.clone(),
            unit: unit.to_string(),
            total,
        })
        .collect();
    items.sort_by(|a, b| b.total.cmp(&a.total));

    let mut categories: Vec<CategoryUsage> = by_category
        .into_iter()
        .map(|((branch, category), total)| CategoryUsage {
            branch,
            category: category.to_string(),
            total,
        })
        .collect();
    categories.sort_by(|a, b| b.total.cmp(&a.total));

    let total = items.iter().map(|i| i.total).sum();

    Ok(UsageSummary {
        period: period.clone(),
        items,
        categories,
        total,
    })
}
