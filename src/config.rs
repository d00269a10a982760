//! Runtime configuration.
//!
//! Everything the fetch→build cycle needs is carried in an explicit [`Config`]
//! built once at startup (from `.env` / the environment, then CLI overrides)
//! and passed down; nothing is read from ambient globals afterwards.

use std::net::SocketAddr;

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://apps.bea.gov/api/data/";
pub const DEFAULT_QUANTITY_TABLE: &str = "T20303";
pub const DEFAULT_PRICE_TABLE: &str = "T20304";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8050";

/// Credential and endpoint for the BEA API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaConfig {
    pub user_id: String,
    pub base_url: String,
}

/// The pair of NIPA tables plotted against each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub quantity: String,
    pub price: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            quantity: DEFAULT_QUANTITY_TABLE.to_string(),
            price: DEFAULT_PRICE_TABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bea: BeaConfig,
    pub tables: TableNames,
    pub listen_addr: SocketAddr,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let user_id = get("BEA_USER_ID")
            .ok_or_else(|| AppError::usage("Missing BEA_USER_ID in environment (.env)."))?;
        let base_url = get("BEA_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let defaults = TableNames::default();
        let tables = TableNames {
            quantity: get("NIPA_QUANTITY_TABLE").unwrap_or(defaults.quantity),
            price: get("NIPA_PRICE_TABLE").unwrap_or(defaults.price),
        };

        let listen_raw = get("NIPA_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = parse_listen_addr(&listen_raw)?;

        let log_format = match get("NIPA_LOG_FORMAT") {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(v) if v.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(v) => {
                return Err(AppError::usage(format!(
                    "Invalid NIPA_LOG_FORMAT '{v}'. Expected 'text' or 'json'."
                )));
            }
            None => LogFormat::Text,
        };

        Ok(Self {
            bea: BeaConfig { user_id, base_url },
            tables,
            listen_addr,
            log_format,
        })
    }
}

pub fn parse_listen_addr(raw: &str) -> Result<SocketAddr, AppError> {
    raw.parse()
        .map_err(|e| AppError::usage(format!("Invalid listen address '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::EXIT_USAGE;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_credential_is_set() {
        let config = Config::from_lookup(lookup(&[("BEA_USER_ID", "abc")])).unwrap();
        assert_eq!(config.bea.user_id, "abc");
        assert_eq!(config.bea.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.tables, TableNames::default());
        assert_eq!(config.listen_addr.to_string(), DEFAULT_LISTEN_ADDR);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn missing_or_blank_credential_is_a_usage_error() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);

        let err = Config::from_lookup(lookup(&[("BEA_USER_ID", "  ")])).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("BEA_USER_ID", "abc"),
            ("NIPA_QUANTITY_TABLE", "T10103"),
            ("NIPA_PRICE_TABLE", "T10104"),
            ("NIPA_LISTEN_ADDR", "0.0.0.0:9000"),
            ("NIPA_LOG_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert_eq!(config.tables.quantity, "T10103");
        assert_eq!(config.tables.price, "T10104");
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn bad_listen_addr_is_rejected() {
        let err = Config::from_lookup(lookup(&[("BEA_USER_ID", "abc"), ("NIPA_LISTEN_ADDR", "nope")]))
            .unwrap_err();
        assert!(err.message().contains("nope"));
    }
}
