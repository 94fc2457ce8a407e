//! Configuration for embedding the library store in an application.
//!
//! # Responsibility
//! - Describe where the database lives and how connections are tuned.
//! - Describe logging level and output directory.
//!
//! # Invariants
//! - Every field has a default, so partial documents deserialize.
//! - `validate()` must pass before a config is used to open resources.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Busy timeout applied when none is configured.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Where and how to open the SQLite store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub location: DatabaseLocation,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            location: DatabaseLocation::Memory,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Storage location of the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatabaseLocation {
    /// On-disk database file.
    File { path: PathBuf },
    /// Private in-memory database, dropped with the connection.
    Memory,
}

/// Logging backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

/// Rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyDatabasePath,
    ZeroBusyTimeout,
    UnsupportedLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDatabasePath => write!(f, "database path cannot be empty"),
            Self::ZeroBusyTimeout => write!(f, "busy_timeout_ms must be greater than zero"),
            Self::UnsupportedLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeLogDir(path) => write!(
                f,
                "log_dir must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

impl LibraryConfig {
    /// Checks every section and returns the first rejected value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.logging.validate()
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let DatabaseLocation::File { path } = &self.location {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyDatabasePath);
            }
        }
        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::ZeroBusyTimeout);
        }
        Ok(())
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::logging::normalize_level(&self.level)
            .ok_or_else(|| ConfigError::UnsupportedLogLevel(self.level.clone()))?;
        if let Some(dir) = &self.log_dir {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DatabaseConfig, DatabaseLocation, LoggingConfig};
    use std::path::PathBuf;

    #[test]
    fn default_database_is_in_memory_with_timeout() {
        let config = DatabaseConfig::default();
        assert_eq!(config.location, DatabaseLocation::Memory);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_file_path_is_rejected() {
        let config = DatabaseConfig {
            location: DatabaseLocation::File {
                path: PathBuf::new(),
            },
            ..DatabaseConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyDatabasePath));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let config = LoggingConfig {
            level: "info".to_string(),
            log_dir: Some(PathBuf::from("logs/dev")),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RelativeLogDir(_))
        ));
    }
}
