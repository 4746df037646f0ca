//! Startup configuration resolved from the process environment.
//!
//! # Responsibility
//! - Resolve where the SQLite database lives.
//! - Resolve the log level and log target.
//!
//! # Invariants
//! - Resolution never touches the filesystem; only `DatabaseLocation::open`
//!   does.
//! - Unset or empty variables fall back to defaults.

use crate::db::{open_db, open_db_in_memory, DbError, DbResult};
use crate::logging::{default_log_level, LogTarget};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const LOG_LEVEL_ENV: &str = "TODO_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "TODO_LOG_DIR";

const APP_DIR_NAME: &str = "todo_core";
const DB_FILE_NAME: &str = "database.db";

/// Configuration error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedDatabaseUrl(String),
    /// No `DATABASE_URL` and no platform config directory to default to.
    NoDefaultLocation,
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedDatabaseUrl(url) => {
                write!(f, "unsupported {DATABASE_URL_ENV} value `{url}`")
            }
            Self::NoDefaultLocation => write!(
                f,
                "{DATABASE_URL_ENV} is unset and no platform config directory is available"
            ),
            Self::RelativeLogDir(path) => write!(
                f,
                "{LOG_DIR_ENV} must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

/// Where the todo database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Memory,
    File(PathBuf),
}

impl DatabaseLocation {
    /// Parses a database URL.
    ///
    /// Accepts `:memory:`, `sqlite::memory:`, a bare path, or a path prefixed
    /// with `sqlite://`, `sqlite:` or `file:`.
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let trimmed = url.trim();
        let path = ["sqlite://", "sqlite:", "file:"]
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(*prefix))
            .unwrap_or(trimmed);

        if path == ":memory:" {
            return Ok(Self::Memory);
        }
        if path.is_empty() || path.contains("://") {
            return Err(ConfigError::UnsupportedDatabaseUrl(url.to_string()));
        }
        Ok(Self::File(PathBuf::from(path)))
    }

    /// `<config dir>/todo_core/database.db`.
    pub fn platform_default() -> Result<Self, ConfigError> {
        dirs::config_dir()
            .map(|dir| Self::File(dir.join(APP_DIR_NAME).join(DB_FILE_NAME)))
            .ok_or(ConfigError::NoDefaultLocation)
    }

    /// Opens and migrates the database, creating parent directories for
    /// file locations.
    pub fn open(&self) -> DbResult<Connection> {
        match self {
            Self::Memory => open_db_in_memory(),
            Self::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|err| {
                        DbError::Unavailable(format!(
                            "failed to create database directory `{}`: {err}",
                            parent.display()
                        ))
                    })?;
                }
                open_db(path)
            }
        }
    }
}

impl Display for DatabaseLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, ":memory:"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Resolved startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub database: DatabaseLocation,
    pub log_level: String,
    pub log_target: LogTarget,
}

impl CoreConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database = match non_empty(DATABASE_URL_ENV) {
            Some(url) => DatabaseLocation::parse(&url)?,
            None => DatabaseLocation::platform_default()?,
        };

        let log_level =
            non_empty(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string());

        let log_target = match non_empty(LOG_DIR_ENV) {
            Some(dir) => {
                let dir = PathBuf::from(dir.trim());
                if !dir.is_absolute() {
                    return Err(ConfigError::RelativeLogDir(dir));
                }
                LogTarget::Directory(dir)
            }
            None => LogTarget::Stderr,
        };

        Ok(Self {
            database,
            log_level,
            log_target,
        })
    }
}
