//! Write-only renderings: printable inventory sheet and CSV downloads.
//!
//! CSV output starts with a UTF-8 BOM so spreadsheet tools pick up the Korean
//! branch names correctly.

use serde::Serialize;
use thiserror::Error;

use larder_inventory::{InventoryRecord, MovementRecord, UsageSummary};

const BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV writer error: {0}")]
    Writer(String),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn export_to_csv<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::Writer(e.to_string()))?;
    let mut out = String::from(BOM);
    out.push_str(&String::from_utf8(bytes)?);
    Ok(out)
}

#[derive(Serialize)]
struct UsageRow<'a> {
    #[serde(rename = "Branch")]
    branch: &'a str,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Item")]
    item: &'a str,
    #[serde(rename = "Unit")]
    unit: &'a str,
    #[serde(rename = "Used")]
    used: String,
}

/// Item section of a usage summary, one row per item.
pub fn usage_csv(summary: &UsageSummary) -> Result<String, ExportError> {
    export_to_csv(summary.items.iter().map(|u| UsageRow {
        branch: u.branch.name(),
        category: &u.category,
        item: &u.item,
        unit: &u.unit,
        used: u.total.normalize().to_string(),
    }))
}

#[derive(Serialize)]
struct MovementRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Branch")]
    branch: &'a str,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Item")]
    item: &'a str,
    #[serde(rename = "Unit")]
    unit: &'a str,
    #[serde(rename = "Type")]
    movement_type: &'static str,
    #[serde(rename = "Qty")]
    qty: String,
}

pub fn movements_csv<'a>(
    movements: impl IntoIterator<Item = &'a MovementRecord>,
) -> Result<String, ExportError> {
    export_to_csv(movements.into_iter().map(|m| MovementRow {
        date: m.date.format("%Y-%m-%d").to_string(),
        branch: m.key.branch.name(),
        category: &m.key.category,
        item: &m.key.item,
        unit: &m.unit,
        movement_type: m.movement_type.as_str(),
        qty: m.qty.normalize().to_string(),
    }))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Standalone printable page; low-stock rows carry the `low` class.
pub fn inventory_html<'a>(
    title: &str,
    records: impl IntoIterator<Item = &'a InventoryRecord>,
) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"ko\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(title)));
    html.push_str(
        "<style>\
         body{font-family:sans-serif}\
         table{border-collapse:collapse;width:100%}\
         th,td{border:1px solid #999;padding:4px 8px}\
         td.num{text-align:right}\
         tr.low td{background:#fde2e2}\
         @media print{button{display:none}}\
         </style>\n</head>\n<body>\n",
    );
    html.push_str(&format!("<h1>{}</h1>\n", escape(title)));
    html.push_str("<button onclick=\"window.print()\">Print</button>\n<table>\n<thead><tr>");
    for header in ["Branch", "Category", "Item", "Unit", "Current", "Min", "Note", "Updated"] {
        html.push_str(&format!("<th>{header}</th>"));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for r in records {
        let class = if r.is_low_stock() { " class=\"low\"" } else { "" };
        html.push_str(&format!(
            "<tr{class}><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td class=\"num\">{}</td><td class=\"num\">{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(r.key.branch.name()),
            escape(&r.key.category),
            escape(&r.key.item),
            escape(&r.unit),
            r.current_qty.normalize(),
            r.min_qty.normalize(),
            escape(&r.note),
            r.last_updated.map(|d| d.to_string()).unwrap_or_default(),
        ));
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}
