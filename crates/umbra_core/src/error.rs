//! Error types for scene data.

use thiserror::Error;

/// Errors raised by scene and raster operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Raster size mismatch: expected {expected:?}, got {actual:?}")]
    RasterMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Raster has {actual} pixels, {width}x{height} needs {expected}")]
    PixelCount {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
