//! Flat-file tables: one logical table per CSV/TSV file.
//!
//! Reads tolerate the shapes older dashboard revisions left on disk (BOMs,
//! UTF-16, Korean headers, missing columns, headerless catalogs). Anything that
//! cannot be decoded or parsed is a hard [`StorageError`]; only a missing file
//! reads as an empty table.

pub mod codec;
pub mod encoding;
pub mod schema;
pub mod table;

use std::path::PathBuf;

use thiserror::Error;

pub use schema::{Schemas, TableSchema};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is neither UTF-8 nor BOM-marked UTF-16", path.display())]
    Encoding { path: PathBuf },

    #[error("malformed table {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}:{line}: invalid {column} {value:?}: {reason}", path.display())]
    InvalidValue {
        path: PathBuf,
        line: u64,
        column: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to encode {column} for {}: {reason}", path.display())]
    Encode {
        path: PathBuf,
        column: &'static str,
        reason: String,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}
