//! Runtime configuration for inventory front ends.
//!
//! # Responsibility
//! - Resolve database location and logging settings from the environment.
//! - Let explicit overrides (CLI flags, FFI arguments) win over the environment.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - A resolved config always carries a canonical log level.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir, LoggingError};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "INVENTORY_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "INVENTORY_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "INVENTORY_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "inventory.sqlite3";

/// Resolved settings shared by the CLI and FFI entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

/// Explicit values that take precedence over the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub db_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<String>,
}

impl TrackerConfig {
    /// Resolves from process environment variables only.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::resolve(&ConfigOverrides::default(), |key| std::env::var(key).ok())
    }

    /// Resolves from `overrides`, falling back to `lookup` for unset values.
    ///
    /// `lookup` is usually `std::env::var`; tests pass a map.
    pub fn resolve(
        overrides: &ConfigOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, LoggingError> {
        let env_value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = overrides
            .db_path
            .clone()
            .or_else(|| env_value(DB_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(default_db_path);

        let log_level = match overrides
            .log_level
            .clone()
            .or_else(|| env_value(LOG_LEVEL_ENV))
        {
            Some(level) => normalize_level(&level)?,
            None => default_log_level(),
        };

        let log_dir = overrides
            .log_dir
            .clone()
            .or_else(|| env_value(LOG_DIR_ENV))
            .map(|dir| normalize_log_dir(&dir))
            .transpose()?;

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}

/// `inventory.sqlite3` under the system temp directory.
pub fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}
