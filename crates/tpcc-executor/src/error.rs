//! Error types for the execution loop.

use thiserror::Error;
use tpcc_backend::BackendError;
use tpcc_results::ResultsError;
use tpcc_types::TransactionType;

/// Errors from the outer transactional fence.
#[derive(Error, Debug)]
pub enum FenceError {
    #[error("Failed to open fence control file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Fence {operation} failed: {source}")]
    Ioctl {
        operation: &'static str,
        #[source]
        source: nix::errno::Errno,
    },
}

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Fence(#[from] FenceError),

    #[error(transparent)]
    Results(#[from] ResultsError),

    /// The backend committed but the fence did not. Re-running the attempt
    /// would apply the backend work twice.
    #[error("Fence commit failed after the backend committed: {0}")]
    FenceCommit(#[source] FenceError),

    #[error("{txn} failed after {attempts} attempt(s): {source}")]
    Aborted {
        txn: TransactionType,
        attempts: u32,
        #[source]
        source: Box<ExecutorError>,
    },
}

impl ExecutorError {
    /// Whether the failure must halt the worker without retrying.
    pub fn is_fatal(&self) -> bool {
        match self {
            ExecutorError::Backend(e) => e.is_fatal(),
            ExecutorError::Aborted { source, .. } => source.is_fatal(),
            _ => false,
        }
    }

    /// Whether another attempt of the same transaction may be made.
    pub fn is_retryable(&self) -> bool {
        !self.is_fatal() && !matches!(self, ExecutorError::FenceCommit(_))
    }
}
