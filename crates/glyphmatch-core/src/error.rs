//! Error types for glyphmatch-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Each variant captures enough context for diagnostics.

use thiserror::Error;

/// glyphmatch-core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Raster size outside the supported range
    #[error("invalid raster size {size}: must be in 1..={max}")]
    InvalidRasterSize { size: u32, max: u32 },

    /// Two rasters that must share a size do not
    #[error("raster size mismatch: {expected} vs {actual}")]
    RasterSizeMismatch { expected: u32, actual: u32 },

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;
