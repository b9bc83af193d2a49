use axum::http::StatusCode;
use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;

use larder_core::{Branch, OrderId};
use larder_inventory::{InventoryFilter, ItemKey, LogMovement, MovementType, RegisterItem, UsagePeriod};
use larder_purchasing::{CartLine, OrderLine};

use crate::app::errors;

type Rejection = axum::response::Response;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    pub branch: Option<String>,
    pub category: Option<String>,
    pub item: Option<String>,
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub low_stock: bool,
}

#[derive(Debug, Deserialize)]
pub struct ItemKeyQuery {
    pub branch: String,
    pub category: String,
    pub item: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OptionsQuery {
    pub branch: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterItemRequest {
    pub branch: String,
    pub category: String,
    pub item: String,
    #[serde(default)]
    pub unit: String,
    pub qty: Decimal,
    #[serde(default, alias = "minQty")]
    pub min_qty: Decimal,
    #[serde(default)]
    pub note: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct LogMovementRequest {
    pub date: Option<NaiveDate>,
    pub branch: String,
    pub category: String,
    pub item: String,
    #[serde(default)]
    pub unit: String,
    #[serde(rename = "type")]
    pub movement_type: String,
    pub qty: Decimal,
}

#[derive(Debug, Default, Deserialize)]
pub struct UsageQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub branch: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogItemQuery {
    pub category: String,
    pub item: String,
}

#[derive(Debug, Deserialize)]
pub struct VendorLookupQuery {
    pub category: String,
    #[serde(default)]
    pub item: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrdersRequest {
    pub branch: String,
    pub date: Option<NaiveDate>,
    pub lines: Vec<CartLine>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmReceiptRequest {
    pub lines: Vec<OrderLine>,
}

// -------------------------
// Parsing helpers
// -------------------------

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Trimmed, with blank values treated as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn parse_branch(s: &str) -> Result<Branch, Rejection> {
    s.parse::<Branch>().map_err(|e| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_branch", e.to_string())
    })
}

pub fn parse_optional_branch(s: Option<&str>) -> Result<Option<Branch>, Rejection> {
    match s.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_branch(s).map(Some),
        None => Ok(None),
    }
}

pub fn parse_order_id(s: &str) -> Result<OrderId, Rejection> {
    s.parse::<OrderId>()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id"))
}

impl InventoryQuery {
    pub fn into_filter(self) -> Result<InventoryFilter, Rejection> {
        Ok(InventoryFilter {
            branch: parse_optional_branch(self.branch.as_deref())?,
            category: non_empty(self.category),
            item: non_empty(self.item),
            date: self.date,
            low_stock_only: self.low_stock,
        })
    }
}

impl ItemKeyQuery {
    pub fn into_key(self) -> Result<ItemKey, Rejection> {
        Ok(ItemKey::new(parse_branch(&self.branch)?, self.category, self.item))
    }
}

impl RegisterItemRequest {
    pub fn into_command(self) -> Result<RegisterItem, Rejection> {
        Ok(RegisterItem {
            key: ItemKey::new(parse_branch(&self.branch)?, self.category, self.item),
            unit: self.unit,
            qty: self.qty,
            min_qty: self.min_qty,
            note: self.note,
            date: self.date.unwrap_or_else(today),
        })
    }
}

impl LogMovementRequest {
    pub fn into_command(self) -> Result<LogMovement, Rejection> {
        let movement_type = self.movement_type.parse::<MovementType>().map_err(|e| {
            errors::json_error(StatusCode::BAD_REQUEST, "invalid_movement_type", e.to_string())
        })?;
        Ok(LogMovement {
            date: self.date.unwrap_or_else(today),
            key: ItemKey::new(parse_branch(&self.branch)?, self.category, self.item),
            unit: self.unit,
            movement_type,
            qty: self.qty,
        })
    }
}

impl UsageQuery {
    /// Missing year/month default to the current month.
    pub fn into_period(self) -> Result<UsagePeriod, Rejection> {
        let now = today();
        Ok(UsagePeriod {
            year: self.year.unwrap_or_else(|| now.year()),
            month: self.month.unwrap_or_else(|| now.month()),
            branch: parse_optional_branch(self.branch.as_deref())?,
            category: non_empty(self.category),
        })
    }
}
