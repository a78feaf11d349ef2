//! Error types for rendering.

use std::error::Error;

use thiserror::Error;
use umbra_core::CoreError;

/// Errors raised while rendering or writing output.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// A render backend failed; the orchestrator retries these.
    #[error("Backend error: {0}")]
    Backend(Box<dyn Error + Send + Sync>),
}

impl RenderError {
    /// Wrap any backend-specific error.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::Backend(err.into())
    }
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
