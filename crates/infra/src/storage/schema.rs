//! Column layouts and the header aliases each table accepts.

/// One expected column and the header spellings that map onto it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub canonical: &'static str,
    pub aliases: Vec<String>,
}

/// Expected columns of one table, in write order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<ColumnSpec>,
}

fn column(canonical: &'static str, aliases: &[&str]) -> ColumnSpec {
    ColumnSpec {
        canonical,
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
    }
}

impl TableSchema {
    pub fn inventory() -> Self {
        Self {
            columns: vec![
                column("Branch", &["지점", "store"]),
                column("Item", &["품목명", "품목", "아이템", "name"]),
                column("Category", &["카테고리", "cat"]),
                column("Unit", &["단위"]),
                column("CurrentQty", &["현재수량", "current_qty", "qty"]),
                column("MinQty", &["최소수량", "min_qty"]),
                column("Note", &["비고", "memo"]),
                column("Date", &["날짜", "last_updated"]),
            ],
        }
    }

    pub fn movements() -> Self {
        Self {
            columns: vec![
                column("Date", &["날짜"]),
                column("Branch", &["지점"]),
                column("Category", &["카테고리", "cat"]),
                column("Item", &["품목명", "품목", "아이템", "name"]),
                column("Unit", &["단위"]),
                column("Type", &["구분", "movement_type"]),
                column("Qty", &["수량", "quantity"]),
            ],
        }
    }

    pub fn catalog() -> Self {
        Self {
            columns: vec![
                column("Category", &["카테고리", "cat"]),
                column("Item", &["name", "아이템", "품목"]),
                column("Unit", &["단위"]),
            ],
        }
    }

    pub fn vendors() -> Self {
        Self {
            columns: vec![
                column("Category", &["카테고리"]),
                column("Item", &["name", "아이템", "품목"]),
                column("Vendor", &["구매처", "업체"]),
                column("Phone", &["전화번호", "연락처"]),
            ],
        }
    }

    pub fn orders() -> Self {
        Self {
            columns: vec![
                column("OrderId", &["order_id"]),
                column("Date", &[]),
                column("Branch", &["지점"]),
                column("Vendor", &["구매처"]),
                column("Items", &[]),
                column("Status", &[]),
                column("CreatedDate", &["created_at"]),
            ],
        }
    }

    /// Accept one more header spelling for `canonical`. Unknown columns are ignored.
    pub fn with_alias(mut self, canonical: &str, alias: impl Into<String>) -> Self {
        if let Some(col) = self.columns.iter_mut().find(|c| c.canonical == canonical) {
            col.aliases.push(alias.into());
        }
        self
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Canonical headers, as written.
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.canonical).collect()
    }

    /// Map a header row onto the schema.
    ///
    /// Headers are compared trimmed and case-insensitively. If nothing matches,
    /// the file has no header: the row is data and columns are positional.
    pub fn resolve(&self, header: &[String]) -> ColumnMap {
        let normalized: Vec<String> = header.iter().map(|h| normalize(h)).collect();

        let indices: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|col| {
                normalized.iter().position(|h| {
                    *h == normalize(col.canonical) || col.aliases.iter().any(|a| *h == normalize(a))
                })
            })
            .collect();

        if indices.iter().all(Option::is_none) {
            return ColumnMap {
                names: self.headers(),
                indices: (0..self.columns.len()).map(Some).collect(),
                header_is_data: true,
            };
        }

        ColumnMap {
            names: self.headers(),
            indices,
            header_is_data: false,
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Header resolution result: where each canonical column lives in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    names: Vec<&'static str>,
    indices: Vec<Option<usize>>,
    header_is_data: bool,
}

impl ColumnMap {
    /// The header row did not name any known column and must be read as data.
    pub fn header_is_data(&self) -> bool {
        self.header_is_data
    }

    /// Cell for `column` in `cells`, trimmed; empty when the column is absent.
    pub fn cell<'a>(&self, cells: &'a [String], column: &str) -> &'a str {
        self.names
            .iter()
            .position(|n| *n == column)
            .and_then(|i| self.indices[i])
            .and_then(|idx| cells.get(idx))
            .map(|c| c.trim())
            .unwrap_or("")
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.names
            .iter()
            .position(|n| *n == column)
            .is_some_and(|i| self.indices[i].is_some())
    }
}

/// Every table layout the repository knows, as one configurable bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schemas {
    pub inventory: TableSchema,
    pub movements: TableSchema,
    pub catalog: TableSchema,
    pub vendors: TableSchema,
    pub orders: TableSchema,
}

impl Default for Schemas {
    fn default() -> Self {
        Self {
            inventory: TableSchema::inventory(),
            movements: TableSchema::movements(),
            catalog: TableSchema::catalog(),
            vendors: TableSchema::vendors(),
            orders: TableSchema::orders(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn korean_headers_resolve_to_canonical_columns() {
        let header = row(&["지점", "품목명", "카테고리", "단위", "현재수량", "최소수량", "비고"]);
        let map = TableSchema::inventory().resolve(&header);
        assert!(!map.header_is_data());

        let cells = row(&["동대문", "Onion", "Vegetable", "kg", "10", "2", ""]);
        assert_eq!(map.cell(&cells, "Item"), "Onion");
        assert_eq!(map.cell(&cells, "CurrentQty"), "10");
        assert!(!map.has_column("Date"));
        assert_eq!(map.cell(&cells, "Date"), "");
    }

    #[test]
    fn headers_match_case_insensitively_in_any_order() {
        let header = row(&[" unit ", "ITEM", "\u{feff}category"]);
        let map = TableSchema::catalog().resolve(&header);
        let cells = row(&["kg", "Onion", "Vegetable"]);
        assert_eq!(map.cell(&cells, "Category"), "Vegetable");
        assert_eq!(map.cell(&cells, "Unit"), "kg");
    }

    #[test]
    fn unknown_header_means_positional_data() {
        let header = row(&["Vegetable", "Onion", "kg"]);
        let map = TableSchema::catalog().resolve(&header);
        assert!(map.header_is_data());
        assert_eq!(map.cell(&header, "Item"), "Onion");
    }

    #[test]
    fn extra_aliases_can_be_configured() {
        let schema = TableSchema::vendors().with_alias("Vendor", "supplier");
        let map = schema.resolve(&row(&["Category", "Item", "Supplier", "Phone"]));
        let cells = row(&["Meat", "", "Seoul Meats", "010"]);
        assert_eq!(map.cell(&cells, "Vendor"), "Seoul Meats");
    }
}
