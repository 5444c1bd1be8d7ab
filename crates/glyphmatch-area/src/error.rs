//! Error types for glyphmatch-area

use thiserror::Error;

/// Errors that can occur during area segmentation
#[derive(Debug, Error)]
pub enum AreaError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] glyphmatch_core::CoreError),

    /// Region analysis error
    #[error("region error: {0}")]
    Region(#[from] glyphmatch_region::RegionError),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for area segmentation
pub type AreaResult<T> = Result<T, AreaError>;
