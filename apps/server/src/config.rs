//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable              | Default            |
//! |-----------------------|--------------------|
//! | `HTTP_PORT`           | `8080`             |
//! | `BIND_ADDRESS`        | `0.0.0.0`          |
//! | `DATABASE_PATH`       | `./stockroom.db`   |
//! | `DB_MAX_CONNECTIONS`  | `5`                |
//! | `LOW_STOCK_THRESHOLD` | `10`               |
//! | `SALE_WRITE_MODE`     | `atomic`           |

use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use stockroom_core::DEFAULT_LOW_STOCK_THRESHOLD;

/// How sale recording and reversal reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Stock, sale row and ledger entry commit together or not at all.
    #[default]
    Atomic,

    /// Sale row first, ledger movement second. A failed recording movement
    /// is logged and the sale kept; a failed reversal movement is reported
    /// as a partial failure.
    BestEffort,
}

impl FromStr for WriteMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atomic" => Ok(WriteMode::Atomic),
            "best_effort" | "best-effort" => Ok(WriteMode::BestEffort),
            _ => Err(ConfigError::InvalidValue("SALE_WRITE_MODE".to_string())),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Atomic => f.write_str("atomic"),
            WriteMode::BestEffort => f.write_str("best_effort"),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Interface to bind
    pub bind_address: IpAddr,

    /// SQLite database file
    pub database_path: String,

    /// Connection pool size
    pub db_max_connections: u32,

    /// Items below this stock level count as low stock
    pub low_stock_threshold: i64,

    /// Sale write strategy
    pub sale_write_mode: WriteMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            http_port: 8080,
            bind_address: IpAddr::from([0, 0, 0, 0]),
            database_path: "./stockroom.db".to_string(),
            db_max_connections: 5,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            sale_write_mode: WriteMode::Atomic,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();

        let config = ServerConfig {
            http_port: parse_or(&lookup, "HTTP_PORT", defaults.http_port)?,
            bind_address: parse_or(&lookup, "BIND_ADDRESS", defaults.bind_address)?,
            database_path: lookup("DATABASE_PATH")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(defaults.database_path),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            low_stock_threshold: parse_or(&lookup, "LOW_STOCK_THRESHOLD", defaults.low_stock_threshold)?,
            sale_write_mode: match lookup("SALE_WRITE_MODE") {
                Some(raw) => raw.parse()?,
                None => defaults.sale_write_mode,
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if config.low_stock_threshold < 0 {
            return Err(ConfigError::InvalidValue("LOW_STOCK_THRESHOLD".to_string()));
        }

        Ok(config)
    }

    /// Address the HTTP listener binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.http_port)
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.database_path, "./stockroom.db");
        assert_eq!(config.low_stock_threshold, 10);
        assert_eq!(config.sale_write_mode, WriteMode::Atomic);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("HTTP_PORT", "9000"),
            ("BIND_ADDRESS", "127.0.0.1"),
            ("SALE_WRITE_MODE", "best_effort"),
            ("LOW_STOCK_THRESHOLD", "3"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9000");
        assert_eq!(config.sale_write_mode, WriteMode::BestEffort);
        assert_eq!(config.low_stock_threshold, 3);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("HTTP_PORT", "eighty")]),
            Err(ConfigError::InvalidValue(key)) if key == "HTTP_PORT"
        ));
        assert!(load(&[("SALE_WRITE_MODE", "yolo")]).is_err());
        assert!(load(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("LOW_STOCK_THRESHOLD", "-1")]).is_err());
    }
}
