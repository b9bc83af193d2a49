use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Vendor name shown for items nobody has been assigned to.
pub const UNKNOWN_VENDOR: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorContact {
    pub vendor: String,
    pub phone: String,
}

impl VendorContact {
    pub fn unknown() -> Self {
        Self {
            vendor: UNKNOWN_VENDOR.to_string(),
            phone: String::new(),
        }
    }
}

/// One row of the vendor mapping table. An empty `item` makes the rule apply to
/// the whole category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorRule {
    pub category: String,
    #[serde(default)]
    pub item: String,
    pub vendor: String,
    #[serde(default)]
    pub phone: String,
}

/// Purchase routing: which vendor supplies which item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorDirectory {
    rules: HashMap<(String, String), VendorContact>,
}

impl VendorDirectory {
    /// Later rules for the same (category, item) replace earlier ones.
    pub fn from_rules(rules: impl IntoIterator<Item = VendorRule>) -> Self {
        let mut map = HashMap::new();
        for rule in rules {
            let category = rule.category.trim().to_string();
            if category.is_empty() {
                continue;
            }
            map.insert(
                (category, rule.item.trim().to_string()),
                VendorContact {
                    vendor: rule.vendor.trim().to_string(),
                    phone: rule.phone.trim().to_string(),
                },
            );
        }
        Self { rules: map }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Exact item rule, then the category-wide rule, then [`UNKNOWN_VENDOR`].
    pub fn lookup(&self, category: &str, item: &str) -> VendorContact {
        self.rules
            .get(&(category.to_string(), item.to_string()))
            .or_else(|| self.rules.get(&(category.to_string(), String::new())))
            .cloned()
            .unwrap_or_else(VendorContact::unknown)
    }
}
