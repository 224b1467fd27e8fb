//! SQLite driver settings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default partition path template.
pub const DEFAULT_DATABASE: &str = "/tmp/tpcc-{w_id}.db";
/// Default page cache size in KiB.
pub const DEFAULT_CACHE_SIZE: i64 = 2000;
/// Default busy timeout in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// `journal_mode` pragma values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    #[default]
    Delete,
    Truncate,
    Persist,
    Memory,
    Wal,
    Off,
}

impl JournalMode {
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Truncate => "truncate",
            Self::Persist => "persist",
            Self::Memory => "memory",
            Self::Wal => "wal",
            Self::Off => "off",
        }
    }
}

/// `locking_mode` pragma values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LockingMode {
    #[default]
    Normal,
    Exclusive,
}

impl LockingMode {
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Exclusive => "exclusive",
        }
    }
}

/// Settings for the `sqlite` driver.
///
/// `database` is a path template containing `{w_id}`; each warehouse lives
/// in its own file. The pragmas are applied to every attached partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    pub database: String,
    pub journal_mode: JournalMode,
    pub locking_mode: LockingMode,
    /// Page cache size in KiB.
    pub cache_size: i64,
    pub busy_timeout_ms: u64,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            journal_mode: JournalMode::default(),
            locking_mode: LockingMode::default(),
            cache_size: DEFAULT_CACHE_SIZE,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl SqliteConfig {
    pub fn with_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }
}

impl fmt::Display for SqliteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "database = {:?}", self.database)?;
        writeln!(f, "journal_mode = {:?}", self.journal_mode.pragma_value())?;
        writeln!(f, "locking_mode = {:?}", self.locking_mode.pragma_value())?;
        writeln!(f, "cache_size = {}", self.cache_size)?;
        write!(f, "busy_timeout_ms = {}", self.busy_timeout_ms)
    }
}
