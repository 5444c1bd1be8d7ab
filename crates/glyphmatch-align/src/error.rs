//! Error types for glyphmatch-align

use thiserror::Error;

/// Errors that can occur during alignment
#[derive(Debug, Error)]
pub enum AlignError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] glyphmatch_core::CoreError),

    /// Morphology error while building target halos
    #[error("morphology error: {0}")]
    Morph(#[from] glyphmatch_morph::MorphError),

    /// Reference corpus error
    #[error("corpus error: {0}")]
    Corpus(#[from] glyphmatch_corpus::CorpusError),

    /// Target image has no ink pixels
    #[error("target image has no ink")]
    BlankTarget,

    /// Raster sizes or halo depths of target and reference differ
    #[error("raster mismatch: target {target}, reference {reference}")]
    RasterMismatch { target: String, reference: String },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for alignment operations
pub type AlignResult<T> = Result<T, AlignError>;
