//! Error types for results collection.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("Benchmark statistics collection was already started")]
    AlreadyStarted,

    #[error("Benchmark statistics collection was never started")]
    NotStarted,

    #[error("Benchmark statistics collection was already stopped")]
    AlreadyStopped,

    #[error("Failed to write results: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),
}
