//! Error types for the proxy protocol.

use thiserror::Error;
use tpcc_backend::BackendError;

/// Errors raised while exchanging frames.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame of {0} bytes exceeds the {max} byte limit", max = crate::protocol::MAX_FRAME_LEN)]
    FrameTooLarge(usize),

    #[error("Connection closed in the middle of a frame")]
    UnexpectedEof,

    #[error("Connection closed by peer")]
    Closed,
}

impl From<ProtocolError> for BackendError {
    fn from(err: ProtocolError) -> Self {
        BackendError::Protocol(err.to_string())
    }
}
