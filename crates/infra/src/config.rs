//! Process configuration from environment variables (and an optional `.env`).
//!
//! | Variable | Default |
//! |---|---|
//! | `LARDER_DATA_DIR` | `/data` if it exists, else `./data` |
//! | `LARDER_BIND` | `0.0.0.0:8080` |
//! | `LARDER_NEGATIVE_STOCK` | `allow` |
//! | `LARDER_LOG_FORMAT` | `json` |

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use thiserror::Error;

use larder_inventory::NegativeStockPolicy;
use larder_observability::LogFormat;

pub const DATA_DIR_VAR: &str = "LARDER_DATA_DIR";
pub const BIND_VAR: &str = "LARDER_BIND";
pub const NEGATIVE_STOCK_VAR: &str = "LARDER_NEGATIVE_STOCK";
pub const LOG_FORMAT_VAR: &str = "LARDER_LOG_FORMAT";

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const CONTAINER_DATA_DIR: &str = "/data";
const LOCAL_DATA_DIR: &str = "./data";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub negative_stock: NegativeStockPolicy,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Read the process environment, after loading `.env` if one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get(BIND_VAR)
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: BIND_VAR,
                message: e.to_string(),
            })?;

        let data_dir = get(DATA_DIR_VAR)
            .map(|v| PathBuf::from(v.trim()))
            .unwrap_or_else(default_data_dir);

        let negative_stock = match get(NEGATIVE_STOCK_VAR) {
            Some(v) => v.parse::<NegativeStockPolicy>().map_err(|e| ConfigError::Invalid {
                key: NEGATIVE_STOCK_VAR,
                message: e.to_string(),
            })?,
            None => NegativeStockPolicy::default(),
        };

        let log_format = match get(LOG_FORMAT_VAR) {
            Some(v) => v.parse::<LogFormat>().map_err(|e| ConfigError::Invalid {
                key: LOG_FORMAT_VAR,
                message: e.to_string(),
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            data_dir,
            negative_stock,
            log_format,
        })
    }
}

fn default_data_dir() -> PathBuf {
    if Path::new(CONTAINER_DATA_DIR).is_dir() {
        PathBuf::from(CONTAINER_DATA_DIR)
    } else {
        PathBuf::from(LOCAL_DATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.negative_stock, NegativeStockPolicy::Allow);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.data_dir, default_data_dir());
    }

    #[test]
    fn values_are_read_from_the_lookup() {
        let cfg = config(&[
            (DATA_DIR_VAR, "/srv/larder"),
            (BIND_VAR, "127.0.0.1:9000"),
            (NEGATIVE_STOCK_VAR, "reject"),
            (LOG_FORMAT_VAR, "pretty"),
        ])
        .unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/larder"));
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.negative_stock, NegativeStockPolicy::Reject);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[(BIND_VAR, "  ")]).unwrap();
        assert_eq!(cfg.bind_addr.port(), 8080);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config(&[(NEGATIVE_STOCK_VAR, "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: NEGATIVE_STOCK_VAR, .. }));

        let err = config(&[(BIND_VAR, "not an address")]).unwrap_err();
        assert!(err.to_string().contains(BIND_VAR));
    }
}
