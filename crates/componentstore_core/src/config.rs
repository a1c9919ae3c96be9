//! Store configuration resolved from the process environment.
//!
//! # Responsibility
//! - Provide defaults for database location, bounded wait and log level.
//! - Parse `COMPONENTSTORE_*` overrides, rejecting malformed values.

use crate::db::DEFAULT_BUSY_TIMEOUT;
use crate::logging::default_log_level;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const ENV_DB_PATH: &str = "COMPONENTSTORE_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "COMPONENTSTORE_BUSY_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "COMPONENTSTORE_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "componentstore.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    /// Upper bound on waiting for a locked database per connection.
    pub busy_timeout: Duration,
    pub log_level: String,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            log_level: default_log_level().to_string(),
        }
    }

    /// Resolves configuration from process environment variables.
    ///
    /// # Errors
    /// - `InvalidValue` when an override is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name
    /// to its raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = non_blank(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        let mut config = Self::new(db_path);

        if let Some(raw) = non_blank(ENV_BUSY_TIMEOUT_MS) {
            let millis = raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_BUSY_TIMEOUT_MS,
                value: raw.clone(),
            })?;
            config.busy_timeout = Duration::from_millis(millis);
        }

        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            config.log_level = level;
        }

        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, StoreConfig, ENV_BUSY_TIMEOUT_MS, ENV_DB_PATH, ENV_LOG_LEVEL};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.db_path.ends_with("componentstore.sqlite3"));
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn overrides_are_trimmed_and_applied() {
        let config = StoreConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, " /var/lib/store.db "),
            (ENV_BUSY_TIMEOUT_MS, "250"),
            (ENV_LOG_LEVEL, "warn"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/store.db"));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn blank_db_path_falls_back_to_default() {
        let config = StoreConfig::from_lookup(lookup(&[(ENV_DB_PATH, "   ")])).unwrap();
        assert!(config.db_path.ends_with("componentstore.sqlite3"));
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let err = StoreConfig::from_lookup(lookup(&[(ENV_BUSY_TIMEOUT_MS, "soon")]))
            .expect_err("non-numeric timeout");
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_BUSY_TIMEOUT_MS,
                value: "soon".to_string()
            }
        );
    }
}
