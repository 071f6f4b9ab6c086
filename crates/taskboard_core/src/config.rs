//! Runtime configuration with environment overrides.
//!
//! # Invariants
//! - Defaults are usable without any environment.
//! - Invalid override values are rejected, never silently ignored.

use crate::board::SyncMode;
use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TASKBOARD_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TASKBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKBOARD_LOG_DIR";
pub const ENV_SYNC_MODE: &str = "TASKBOARD_SYNC_MODE";

const DEFAULT_DB_FILE_NAME: &str = "taskboard.sqlite3";

/// Path value that selects an in-memory database.
pub const IN_MEMORY_DB_PATH: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is disabled when unset.
    pub log_dir: Option<PathBuf>,
    pub sync_mode: SyncMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            sync_mode: SyncMode::default(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `TASKBOARD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`; blank values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        if let Some(path) = value(ENV_DB_PATH) {
            self.db_path = PathBuf::from(path);
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(dir) = value(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(mode) = value(ENV_SYNC_MODE) {
            self.sync_mode = mode
                .parse()
                .map_err(|message| ConfigError::InvalidValue {
                    key: ENV_SYNC_MODE,
                    message,
                })?;
        }
        Ok(self)
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path.as_os_str() == IN_MEMORY_DB_PATH
    }
}
