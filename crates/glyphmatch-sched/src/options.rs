//! Scheduler options

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SchedError, SchedResult};

/// Options for [`Scheduler`](crate::Scheduler)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerOptions {
    /// Worker threads (default: 4)
    pub threads: usize,
    /// Jobs queued before submission blocks (default: 10)
    pub queue_capacity: usize,
    /// Time given to running jobs at shutdown, in milliseconds (default: 5000)
    pub shutdown_timeout_ms: u64,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            threads: 4,
            queue_capacity: 10,
            shutdown_timeout_ms: 5000,
        }
    }
}

impl SchedulerOptions {
    /// Set the number of worker threads
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the queue capacity
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the shutdown wait
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn validate(&self) -> SchedResult<()> {
        if self.threads == 0 {
            return Err(SchedError::InvalidParameters("threads must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(SchedError::InvalidParameters("queue_capacity must be at least 1".into()));
        }
        Ok(())
    }
}
