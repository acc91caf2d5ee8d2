//! Admin configuration.
//!
//! Loaded from environment variables with fallback to defaults.
//!
//! | Variable               | Default                                  |
//! |------------------------|------------------------------------------|
//! | `TILL_DB_PATH`         | `<platform data dir>/till.db`            |
//! | `TILL_MAX_CONNECTIONS` | `5`                                      |
//! | `TILL_DEVICE_ID`       | `pos-01`                                 |
//! | `TILL_LOG`             | `RUST_LOG`, else `info,till=debug,sqlx=warn` |

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use till_db::DbConfig;

pub const DEFAULT_LOG_FILTER: &str = "info,till=debug,sqlx=warn";
pub const DEFAULT_DEVICE_ID: &str = "pos-01";
const DB_FILE_NAME: &str = "till.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size (default: 5)
    pub max_connections: u32,

    /// Name of this terminal, attached to log output
    pub device_id: String,

    /// tracing-subscriber filter directive
    pub log_filter: String,
}

impl AdminConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_vars(env::vars().collect())
    }

    /// Load configuration from an explicit variable map.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| vars.get(name).filter(|v| !v.trim().is_empty()).cloned();

        let db_path = match get("TILL_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_db_path()?,
        };

        let max_connections = get("TILL_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ConfigError::InvalidValue("TILL_MAX_CONNECTIONS".to_string()))?;

        Ok(AdminConfig {
            db_path,
            max_connections,
            device_id: get("TILL_DEVICE_ID").unwrap_or_else(|| DEFAULT_DEVICE_ID.to_string()),
            log_filter: get("TILL_LOG")
                .or_else(|| get("RUST_LOG"))
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path).max_connections(self.max_connections)
    }
}

/// `~/.local/share/till-pos/till.db` and the platform equivalents.
fn default_db_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "till", "pos").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join(DB_FILE_NAME))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Could not determine the app data directory; set TILL_DB_PATH")]
    NoDataDir,
}
