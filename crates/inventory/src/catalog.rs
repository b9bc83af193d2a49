//! Item catalog: the category → item → unit reference list that feeds the
//! registration and ordering forms.

use serde::{Deserialize, Serialize};

use larder_core::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub category: String,
    pub item: String,
    #[serde(default)]
    pub unit: String,
}

impl CatalogEntry {
    pub fn new(
        category: impl Into<String>,
        item: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into().trim().to_string(),
            item: item.into().trim().to_string(),
            unit: unit.into().trim().to_string(),
        }
    }

    /// Rows a spreadsheet export tends to leave behind: blanks and repeated headers.
    fn is_usable(&self) -> bool {
        !self.category.is_empty()
            && !self.item.is_empty()
            && !self.category.eq_ignore_ascii_case("category")
            && self.category != "카테고리"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCatalog {
    entries: Vec<CatalogEntry>,
}

impl ItemCatalog {
    /// Build from raw rows, dropping unusable ones.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        Self {
            entries: entries.into_iter().filter(CatalogEntry::is_usable).collect(),
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn categories(&self) -> Vec<String> {
        let mut out: Vec<String> = self.entries.iter().map(|e| e.category.clone()).collect();
        out.sort();
        out.dedup();
        out
    }

    pub fn units(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .entries
            .iter()
            .filter(|e| !e.unit.is_empty())
            .map(|e| e.unit.clone())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    pub fn items_by_category(&self, category: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.item.clone())
            .collect();
        out.sort();
        out
    }

    /// Unit for an item, empty when the catalog does not know it.
    pub fn unit_for_item(&self, category: &str, item: &str) -> &str {
        self.entries
            .iter()
            .find(|e| e.category == category && e.item == item)
            .map(|e| e.unit.as_str())
            .unwrap_or("")
    }

    /// Add an entry, or replace the unit of the existing category+item.
    /// Returns `true` when a new entry was added.
    pub fn upsert(&mut self, entry: CatalogEntry) -> DomainResult<bool> {
        let entry = CatalogEntry::new(entry.category, entry.item, entry.unit);
        if !entry.is_usable() {
            return Err(DomainError::validation(
                "catalog entries need a category and an item name",
            ));
        }

        match self
            .entries
            .iter_mut()
            .find(|e| e.category == entry.category && e.item == entry.item)
        {
            Some(existing) => {
                existing.unit = entry.unit;
                Ok(false)
            }
            None => {
                self.entries.push(entry);
                Ok(true)
            }
        }
    }

    /// Returns `true` when something was removed.
    pub fn remove(&mut self, category: &str, item: &str) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|e| !(e.category == category && e.item == item));
        self.entries.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ItemCatalog {
        ItemCatalog::from_entries([
            CatalogEntry::new("Category", "Item", "Unit"),
            CatalogEntry::new("Vegetable", "Onion", "kg"),
            CatalogEntry::new("Meat", "Chicken", "kg"),
            CatalogEntry::new("Vegetable", "Cabbage", "pcs"),
            CatalogEntry::new("", "Ghost", "kg"),
            CatalogEntry::new("Sauce", "Soy", ""),
        ])
    }

    #[test]
    fn header_and_blank_rows_are_dropped() {
        assert_eq!(catalog().entries().len(), 4);
    }

    #[test]
    fn items_by_category_is_exact_and_sorted() {
        let c = catalog();
        assert_eq!(
            c.items_by_category("Vegetable"),
            vec!["Cabbage".to_string(), "Onion".to_string()]
        );
        assert_eq!(c.items_by_category("Meat"), vec!["Chicken".to_string()]);
        assert!(c.items_by_category("vegetable").is_empty());
    }

    #[test]
    fn categories_and_units_are_distinct() {
        let c = catalog();
        assert_eq!(c.categories(), vec!["Meat", "Sauce", "Vegetable"]);
        assert_eq!(c.units(), vec!["kg", "pcs"]);
    }

    #[test]
    fn unit_lookup_falls_back_to_empty() {
        let c = catalog();
        assert_eq!(c.unit_for_item("Vegetable", "Cabbage"), "pcs");
        assert_eq!(c.unit_for_item("Vegetable", "Durian"), "");
    }

    #[test]
    fn upsert_replaces_unit_and_remove_deletes() {
        let mut c = catalog();
        assert!(!c.upsert(CatalogEntry::new("Vegetable", "Onion", "box")).unwrap());
        assert_eq!(c.unit_for_item("Vegetable", "Onion"), "box");
        assert!(c.upsert(CatalogEntry::new("Seafood", "Squid", "kg")).unwrap());
        assert!(c.upsert(CatalogEntry::new(" ", "Squid", "kg")).is_err());

        assert!(c.remove("Seafood", "Squid"));
        assert!(!c.remove("Seafood", "Squid"));
    }
}
