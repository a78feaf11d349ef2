//! Error types for the remote service.

use thiserror::Error;
use umbra_renderer::RenderError;

/// Errors raised on either side of a remote call.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed or truncated data on the wire.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The service ran but reported a failure.
    #[error("Service failed: {0}")]
    Service(String),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),
}

impl From<RemoteError> for RenderError {
    fn from(err: RemoteError) -> Self {
        RenderError::backend(err)
    }
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;
