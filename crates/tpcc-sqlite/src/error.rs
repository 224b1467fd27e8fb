//! Error types for the SQLite transport.

use thiserror::Error;
use tpcc_backend::BackendError;

/// Errors raised by the local SQLite connection.
#[derive(Error, Debug)]
pub enum SqliteError {
    /// SQLite statement or connection error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Invalid connection settings.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<SqliteError> for BackendError {
    fn from(err: SqliteError) -> Self {
        BackendError::Sql(err.to_string())
    }
}
