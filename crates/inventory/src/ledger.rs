use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use larder_core::{Branch, DomainError, DomainResult, Entity};

use crate::query::InventoryFilter;
use crate::record::{InventoryRecord, ItemKey, MovementRecord, MovementType};
use crate::usage::{UsagePeriod, UsageSummary};

/// What to do with an OUT movement that would take stock below zero.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeStockPolicy {
    /// Apply and log the movement, and report a warning.
    #[default]
    Allow,
    /// Leave snapshot and log untouched, and report a warning.
    Reject,
}

impl core::str::FromStr for NegativeStockPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "reject" => Ok(Self::Reject),
            other => Err(DomainError::validation(format!(
                "negative stock policy must be allow or reject, got {other:?}"
            ))),
        }
    }
}

/// Command: register a new row or overwrite an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterItem {
    #[serde(flatten)]
    pub key: ItemKey,
    #[serde(default)]
    pub unit: String,
    pub qty: Decimal,
    #[serde(default)]
    pub min_qty: Decimal,
    #[serde(default)]
    pub note: String,
    pub date: NaiveDate,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterOutcome {
    Created,
    Updated,
}

/// Command: record one IN/OUT movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMovement {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub key: ItemKey,
    #[serde(default)]
    pub unit: String,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub qty: Decimal,
}

/// Non-blocking problems surfaced to the person at the counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockWarning {
    /// The movement leaves (or would leave) the row below zero.
    NegativeStock { key: ItemKey, quantity: Decimal },
    /// OUT for a row that does not exist.
    UnknownItem { key: ItemKey },
}

impl core::fmt::Display for StockWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StockWarning::NegativeStock { key, quantity } => {
                write!(f, "stock for {key} goes negative ({quantity})")
            }
            StockWarning::UnknownItem { key } => write!(f, "no inventory row for {key}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MovementOutcome {
    /// Movement appended and snapshot updated.
    Applied {
        current_qty: Decimal,
        created: bool,
        warning: Option<StockWarning>,
    },
    /// Nothing was written.
    Rejected { warning: StockWarning },
}

impl MovementOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MovementOutcome::Applied { .. })
    }

    pub fn warning(&self) -> Option<&StockWarning> {
        match self {
            MovementOutcome::Applied { warning, .. } => warning.as_ref(),
            MovementOutcome::Rejected { warning } => Some(warning),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "record", rename_all = "snake_case")]
pub enum DeleteOutcome {
    Deleted(InventoryRecord),
    NotFound,
}

/// The inventory ledger: current-state snapshot plus the movement log it is
/// reconciled against.
///
/// Invariants maintained by every operation:
/// - at most one snapshot row per [`ItemKey`]
/// - every applied movement changes exactly one row by its signed quantity
/// - the movement log is append-only
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryLedger {
    records: Vec<InventoryRecord>,
    movements: Vec<MovementRecord>,
    policy: NegativeStockPolicy,
}

impl InventoryLedger {
    pub fn new(policy: NegativeStockPolicy) -> Self {
        Self {
            records: Vec::new(),
            movements: Vec::new(),
            policy,
        }
    }

    /// Rebuild a ledger from persisted tables.
    ///
    /// Rows repeating an already-seen key are dropped (first one wins); their keys
    /// are returned so the caller can report them.
    pub fn from_parts(
        records: Vec<InventoryRecord>,
        movements: Vec<MovementRecord>,
        policy: NegativeStockPolicy,
    ) -> (Self, Vec<ItemKey>) {
        let mut seen: HashSet<ItemKey> = HashSet::with_capacity(records.len());
        let mut kept: Vec<InventoryRecord> = Vec::with_capacity(records.len());
        let mut dropped = Vec::new();
        for record in records {
            if seen.insert(record.key.clone()) {
                kept.push(record);
            } else {
                dropped.push(record.key);
            }
        }

        let ledger = Self {
            records: kept,
            movements,
            policy,
        };
        (ledger, dropped)
    }

    pub fn into_parts(self) -> (Vec<InventoryRecord>, Vec<MovementRecord>) {
        (self.records, self.movements)
    }

    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    pub fn movements(&self) -> &[MovementRecord] {
        &self.movements
    }

    pub fn policy(&self) -> NegativeStockPolicy {
        self.policy
    }

    pub fn get(&self, key: &ItemKey) -> Option<&InventoryRecord> {
        self.records.iter().find(|r| r.id() == key)
    }

    fn position(&self, key: &ItemKey) -> Option<usize> {
        self.records.iter().position(|r| r.id() == key)
    }

    /// Register a row, or overwrite unit/qty/min/note/date of the existing one.
    pub fn register(&mut self, cmd: RegisterItem) -> DomainResult<RegisterOutcome> {
        cmd.key.validate()?;
        if cmd.qty < Decimal::ZERO {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if cmd.min_qty < Decimal::ZERO {
            return Err(DomainError::validation("minimum quantity cannot be negative"));
        }

        let record = InventoryRecord {
            key: cmd.key,
            unit: cmd.unit.trim().to_string(),
            current_qty: cmd.qty,
            min_qty: cmd.min_qty,
            note: cmd.note,
            last_updated: Some(cmd.date),
        };

        match self.position(&record.key) {
            Some(idx) => {
                self.records[idx] = record;
                Ok(RegisterOutcome::Updated)
            }
            None => {
                self.records.push(record);
                Ok(RegisterOutcome::Created)
            }
        }
    }

    pub fn delete(&mut self, key: &ItemKey) -> DeleteOutcome {
        match self.position(key) {
            Some(idx) => DeleteOutcome::Deleted(self.records.remove(idx)),
            None => DeleteOutcome::NotFound,
        }
    }

    /// Record a movement and reconcile the snapshot against it.
    ///
    /// - IN for an unknown key creates the row (`min_qty = 0`).
    /// - OUT for an unknown key is rejected; nothing is logged.
    /// - OUT below zero follows the ledger's [`NegativeStockPolicy`].
    pub fn log_movement(&mut self, cmd: LogMovement) -> DomainResult<MovementOutcome> {
        cmd.key.validate()?;
        if cmd.qty <= Decimal::ZERO {
            return Err(DomainError::validation("movement quantity must be positive"));
        }

        let unit = cmd.unit.trim().to_string();

        let Some(idx) = self.position(&cmd.key) else {
            if cmd.movement_type == MovementType::Out {
                return Ok(MovementOutcome::Rejected {
                    warning: StockWarning::UnknownItem { key: cmd.key },
                });
            }

            self.records.push(InventoryRecord {
                key: cmd.key.clone(),
                unit: unit.clone(),
                current_qty: cmd.qty,
                min_qty: Decimal::ZERO,
                note: String::new(),
                last_updated: Some(cmd.date),
            });
            self.append(cmd, unit);

            return Ok(MovementOutcome::Applied {
                current_qty: self.records[self.records.len() - 1].current_qty,
                created: true,
                warning: None,
            });
        };

        let next = self.records[idx].current_qty + cmd.movement_type.signed(cmd.qty);
        let warning = (cmd.movement_type == MovementType::Out && next < Decimal::ZERO).then(|| {
            StockWarning::NegativeStock {
                key: cmd.key.clone(),
                quantity: next,
            }
        });

        if let Some(warning) = warning.clone() {
            if self.policy == NegativeStockPolicy::Reject {
                return Ok(MovementOutcome::Rejected { warning });
            }
        }

        let record = &mut self.records[idx];
        record.current_qty = next;
        record.last_updated = Some(cmd.date);
        if record.unit.is_empty() {
            record.unit = unit.clone();
        }
        self.append(cmd, unit);

        Ok(MovementOutcome::Applied {
            current_qty: next,
            created: false,
            warning,
        })
    }

    fn append(&mut self, cmd: LogMovement, unit: String) {
        self.movements.push(MovementRecord {
            date: cmd.date,
            key: cmd.key,
            unit,
            movement_type: cmd.movement_type,
            qty: cmd.qty,
        });
    }

    /// Rows matching every supplied filter, in snapshot order.
    pub fn query(&self, filter: &InventoryFilter) -> Vec<&InventoryRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }

    /// Distinct categories present at `branch` (or anywhere), sorted.
    pub fn categories(&self, branch: Option<Branch>) -> Vec<String> {
        let mut out: Vec<String> = self
            .records
            .iter()
            .filter(|r| branch.is_none_or(|b| r.key.branch == b))
            .map(|r| r.key.category.clone())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Distinct item names narrowed by branch and category, sorted.
    pub fn items(&self, branch: Option<Branch>, category: Option<&str>) -> Vec<String> {
        let mut out: Vec<String> = self
            .records
            .iter()
            .filter(|r| branch.is_none_or(|b| r.key.branch == b))
            .filter(|r| category.is_none_or(|c| r.key.category == c))
            .map(|r| r.key.item.clone())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    pub fn usage_summary(&self, period: &UsagePeriod) -> DomainResult<UsageSummary> {
        crate::usage::summarize(&self.movements, period)
    }
}
