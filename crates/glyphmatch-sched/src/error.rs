//! Error types for glyphmatch-sched

use thiserror::Error;

use crate::batch::TaskFailure;

/// Errors that can occur while scheduling work
#[derive(Debug, Error)]
pub enum SchedError {
    /// The scheduler has been shut down
    #[error("scheduler is stopped")]
    Stopped,

    /// Every task of a non-empty batch failed
    #[error("all {count} tasks failed; first: {first}")]
    AllTasksFailed { count: usize, first: TaskFailure },

    /// The caller's wait expired before the batch completed
    #[error("timed out with {completed} of {total} tasks complete")]
    Timeout { completed: usize, total: usize },

    /// Worker thread could not be started
    #[error("failed to spawn worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A lock was poisoned by a panicking thread
    #[error("scheduler lock poisoned")]
    LockPoisoned,
}

/// Result type for scheduler operations
pub type SchedResult<T> = Result<T, SchedError>;
