//! Error types for glyphmatch

use thiserror::Error;

/// Errors surfaced by [`Recognizer`](crate::Recognizer)
#[derive(Debug, Error)]
pub enum Error {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] glyphmatch_core::CoreError),

    /// Segmentation error
    #[error("segmentation error: {0}")]
    Area(#[from] glyphmatch_area::AreaError),

    /// Reference corpus error (missing or corrupt data)
    #[error("corpus error: {0}")]
    Corpus(#[from] glyphmatch_corpus::CorpusError),

    /// Alignment error
    #[error("alignment error: {0}")]
    Align(#[from] glyphmatch_align::AlignError),

    /// Scheduler error, including a batch in which every task failed
    #[error("scheduler error: {0}")]
    Sched(#[from] glyphmatch_sched::SchedError),

    /// Recognition requested before a target image was set
    #[error("no target image set")]
    NoTargetImage,

    /// Invalid option combination
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A lock was poisoned by a panicking thread
    #[error("recognizer lock poisoned")]
    LockPoisoned,
}

/// Result type for glyphmatch operations
pub type Result<T> = std::result::Result<T, Error>;
