use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use larder_core::Branch;
use larder_inventory::ItemCatalog;

use crate::order::OrderLine;
use crate::vendor::VendorDirectory;

/// What the branch wants to buy, before it is split per vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub category: String,
    pub item: String,
    pub qty: Decimal,
}

/// Cart lines that go to one vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorBatch {
    pub vendor: String,
    pub phone: String,
    pub lines: Vec<OrderLine>,
}

impl VendorBatch {
    /// Plain-text purchase request, ready to paste into a message to the vendor.
    pub fn request_message(&self, branch: Branch, date: NaiveDate) -> String {
        let mut body = format!("[Everest 구매요청]\n지점: {branch}\n날짜: {date}\n");
        for line in &self.lines {
            body.push_str(&format!(
                "\n- {} {} {}",
                line.item,
                line.qty.normalize(),
                line.unit
            ));
        }
        body
    }
}

/// Split a cart into one batch per vendor.
///
/// Lines with a non-positive quantity are dropped. Batches come out in vendor
/// name order; lines keep their cart order. Units come from the catalog.
pub fn group_cart_by_vendor(
    cart: &[CartLine],
    vendors: &VendorDirectory,
    catalog: &ItemCatalog,
) -> Vec<VendorBatch> {
    let mut grouped: BTreeMap<String, VendorBatch> = BTreeMap::new();

    for line in cart.iter().filter(|l| l.qty > Decimal::ZERO) {
        let category = line.category.trim();
        let item = line.item.trim();
        let contact = vendors.lookup(category, item);

        let batch = grouped
            .entry(contact.vendor.clone())
            .or_insert_with(|| VendorBatch {
                vendor: contact.vendor,
                phone: contact.phone,
                lines: Vec::new(),
            });

        batch.lines.push(OrderLine {
            category: category.to_string(),
            item: item.to_string(),
            qty: line.qty,
            unit: catalog.unit_for_item(category, item).to_string(),
        });
    }

    grouped.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendor::VendorRule;
    use larder_inventory::CatalogEntry;

    fn vendors() -> VendorDirectory {
        VendorDirectory::from_rules([
            VendorRule {
                category: "Meat".to_string(),
                item: String::new(),
                vendor: "Seoul Meats".to_string(),
                phone: "010-3333-4444".to_string(),
            },
            VendorRule {
                category: "Vegetable".to_string(),
                item: "Onion".to_string(),
                vendor: "Green Farm".to_string(),
                phone: "010-5555-6666".to_string(),
            },
        ])
    }

    fn catalog() -> ItemCatalog {
        ItemCatalog::from_entries([
            CatalogEntry::new("Meat", "Chicken", "kg"),
            CatalogEntry::new("Vegetable", "Onion", "kg"),
            CatalogEntry::new("Spice", "Salt", "bag"),
        ])
    }

    fn line(category: &str, item: &str, qty: i64) -> CartLine {
        CartLine {
            category: category.to_string(),
            item: item.to_string(),
            qty: Decimal::from(qty),
        }
    }

    #[test]
    fn groups_per_vendor_and_drops_empty_lines() {
        let cart = vec![
            line("Meat", "Chicken", 5),
            line("Vegetable", "Onion", 10),
            line("Meat", "Pork", 0),
            line("Spice", "Salt", 2),
            line("Meat", "Beef", 3),
        ];
        let batches = group_cart_by_vendor(&cart, &vendors(), &catalog());

        let names: Vec<&str> = batches.iter().map(|b| b.vendor.as_str()).collect();
        assert_eq!(names, vec!["Green Farm", "Seoul Meats", "Unknown"]);

        let meats = &batches[1];
        assert_eq!(meats.phone, "010-3333-4444");
        let items: Vec<&str> = meats.lines.iter().map(|l| l.item.as_str()).collect();
        assert_eq!(items, vec!["Chicken", "Beef"]);
        assert_eq!(meats.lines[0].unit, "kg");
        assert_eq!(meats.lines[1].unit, "");

        assert_eq!(batches[2].lines[0].unit, "bag");
    }

    #[test]
    fn request_message_lists_every_line() {
        let cart = vec![line("Meat", "Chicken", 5), line("Meat", "Beef", 3)];
        let batches = group_cart_by_vendor(&cart, &vendors(), &catalog());
        let msg = batches[0].request_message(
            Branch::Yangjae,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        );

        assert!(msg.starts_with("[Everest 구매요청]"));
        assert!(msg.contains("지점: 양재"));
        assert!(msg.contains("날짜: 2024-06-01"));
        assert!(msg.contains("- Chicken 5 kg"));
        assert!(msg.contains("- Beef 3 "));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: grouping neither loses nor invents quantity.
            #[test]
            fn grouping_preserves_positive_quantity(
                qtys in prop::collection::vec(-5i64..50, 0..30)
            ) {
                let cats = ["Meat", "Vegetable", "Spice"];
                let cart: Vec<CartLine> = qtys
                    .iter()
                    .enumerate()
                    .map(|(i, q)| line(cats[i % 3], "Thing", *q))
                    .collect();

                let batches = group_cart_by_vendor(&cart, &vendors(), &catalog());
                let grouped: Decimal = batches
                    .iter()
                    .flat_map(|b| b.lines.iter())
                    .map(|l| l.qty)
                    .sum();
                let expected: i64 = qtys.iter().filter(|q| **q > 0).sum();
                prop_assert_eq!(grouped, Decimal::from(expected));
            }
        }
    }
}
