//! Error types for glyphmatch-corpus

use thiserror::Error;

/// Errors that can occur while building, storing or loading a corpus
#[derive(Debug, Error)]
pub enum CorpusError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] glyphmatch_core::CoreError),

    /// Morphology error while building halos
    #[error("morphology error: {0}")]
    Morph(#[from] glyphmatch_morph::MorphError),

    /// No stored unit for a font; rebuild the corpus
    #[error("reference data for font '{font}' not found (key {key}); rebuild the corpus")]
    CacheMissing { font: String, key: String },

    /// A stored unit exists but cannot be decoded
    #[error("reference data {key} is corrupt: {message}")]
    CacheCorrupt { key: String, message: String },

    /// Font file could not be read or parsed
    #[error("failed to load font '{name}' from {path}: {message}")]
    FontLoad {
        name: String,
        path: String,
        message: String,
    },

    /// Glyphs could not be encoded for storage
    #[error("encoding error: {0}")]
    Encode(#[from] bincode::Error),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Store I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock was poisoned by a panicking thread
    #[error("corpus lock poisoned")]
    LockPoisoned,
}

/// Result type for corpus operations
pub type CorpusResult<T> = Result<T, CorpusError>;
