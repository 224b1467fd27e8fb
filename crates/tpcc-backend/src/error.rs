//! Error types for backend operations.

use thiserror::Error;

/// Errors raised while executing a transaction against a backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// A statement failed (syntax, constraint, lock contention).
    #[error("SQL error: {0}")]
    Sql(String),

    /// Connectivity or framing fault talking to a remote backend.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A row the transaction profile requires is missing.
    #[error("Row not found: {0}")]
    NotFound(String),

    /// A warehouse id that cannot name a partition.
    #[error("Invalid partition id: {0}")]
    InvalidPartition(i64),

    /// A transaction needs more partitions than one connection can attach.
    #[error("Transaction touches {needed} partitions, a connection attaches at most {limit}")]
    TooManyPartitions { needed: usize, limit: usize },

    /// A district id outside the fixed stock distribution columns.
    #[error("Invalid district id: {0}")]
    InvalidDistrict(i64),

    /// The partition path template cannot address individual warehouses.
    #[error("Invalid partition layout: {0}")]
    InvalidLayout(String),

    /// The database violates a benchmark invariant. Never retried.
    #[error("Integrity violation: {0}")]
    Integrity(String),
}

impl BackendError {
    /// Fatal errors halt the worker instead of being retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BackendError::Integrity(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_integrity_is_fatal() {
        assert!(BackendError::Integrity("sum is null".into()).is_fatal());
        assert!(!BackendError::Sql("database is locked".into()).is_fatal());
        assert!(!BackendError::Protocol("connection reset".into()).is_fatal());
        assert!(!BackendError::NotFound("customer".into()).is_fatal());
        assert!(!BackendError::TooManyPartitions {
            needed: 11,
            limit: 10
        }
        .is_fatal());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            BackendError::InvalidPartition(0).to_string(),
            "Invalid partition id: 0"
        );
    }
}
