//! Whole-file table reads and atomic whole-file rewrites.

use std::io::Write;
use std::path::Path;

use super::encoding::{decode, sniff_delimiter};
use super::schema::{ColumnMap, TableSchema};
use super::StorageError;

/// One data row with its 1-based line number in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: u64,
    pub cells: Vec<String>,
}

impl RawRow {
    fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

/// A decoded table with its header already resolved against a schema.
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: ColumnMap,
    pub rows: Vec<RawRow>,
}

impl Table {
    pub fn cell<'a>(&self, row: &'a RawRow, column: &str) -> &'a str {
        self.columns.cell(&row.cells, column)
    }
}

/// Read a whole table. A missing or empty file is `Ok(None)`.
pub fn read_table(path: &Path, schema: &TableSchema) -> Result<Option<Table>, StorageError> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::io(path, e)),
    };

    let text = decode(&bytes).ok_or_else(|| StorageError::Encoding {
        path: path.to_path_buf(),
    })?;
    if text.trim().is_empty() {
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(sniff_delimiter(&text))
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| StorageError::csv(path, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        rows.push(RawRow {
            line,
            cells: record.iter().map(|c| c.to_string()).collect(),
        });
    }

    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Ok(None);
    };

    let columns = schema.resolve(&header.cells);
    let mut data: Vec<RawRow> = Vec::new();
    if columns.header_is_data() {
        data.push(header);
    }
    data.extend(rows);
    data.retain(|r| !r.is_blank());

    Ok(Some(Table {
        columns,
        rows: data,
    }))
}

/// Rewrite a whole table: UTF-8 with BOM, canonical headers.
///
/// The content goes to a temporary file next to `path` which is then renamed
/// over it, so readers never observe a half-written table.
pub fn write_table(
    path: &Path,
    schema: &TableSchema,
    delimiter: u8,
    rows: impl IntoIterator<Item = Vec<String>>,
) -> Result<(), StorageError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
    tmp.write_all(&[0xEF, 0xBB, 0xBF])
        .map_err(|e| StorageError::io(path, e))?;

    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(tmp.as_file_mut());
        writer
            .write_record(schema.headers())
            .map_err(|e| StorageError::csv(path, e))?;
        for row in rows {
            writer
                .write_record(&row)
                .map_err(|e| StorageError::csv(path, e))?;
        }
        writer.flush().map_err(|e| StorageError::io(path, e))?;
    }

    tmp.persist(path)
        .map_err(|e| StorageError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_empty_files_read_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");
        assert!(read_table(&missing, &TableSchema::catalog()).unwrap().is_none());

        let empty = dir.path().join("empty.csv");
        std::fs::write(&empty, "\u{feff}\n").unwrap();
        assert!(read_table(&empty, &TableSchema::catalog()).unwrap().is_none());
    }

    #[test]
    fn written_tables_carry_a_bom_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("catalog.csv");
        let schema = TableSchema::catalog();

        write_table(
            &path,
            &schema,
            b',',
            vec![vec!["Vegetable".to_string(), "Onion".to_string(), "kg".to_string()]],
        )
        .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));

        let table = read_table(&path, &schema).unwrap().unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.cell(&table.rows[0], "Item"), "Onion");
        assert_eq!(table.rows[0].line, 2);
    }

    #[test]
    fn undecodable_file_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cp949.csv");
        std::fs::write(&path, [0xBE, 0xE7, 0xC6, 0xC4, b'\n']).unwrap();
        let err = read_table(&path, &TableSchema::catalog()).unwrap_err();
        assert!(matches!(err, StorageError::Encoding { .. }));
    }

    #[test]
    fn blank_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        std::fs::write(&path, "Category,Item,Unit\n,,\nMeat,Chicken,kg\n").unwrap();
        let table = read_table(&path, &TableSchema::catalog()).unwrap().unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].line, 3);
    }
}
