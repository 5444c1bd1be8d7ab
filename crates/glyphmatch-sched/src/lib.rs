//! glyphmatch-sched - Task scheduler
//!
//! A fixed pool of worker threads pulls jobs from a bounded queue. Work is
//! submitted in batches: [`Scheduler::submit`] enqueues one job per input
//! (blocking while the queue is full) and returns a [`BatchHandle`];
//! [`BatchHandle::await_all`] yields one outcome per input in submission
//! order, whatever order the workers finish in.
//!
//! A failing or panicking job marks only its own slot with a
//! [`TaskFailure`]. On shutdown queued jobs are discarded (their slots
//! report a failure) and running jobs are given a bounded time to finish.

mod batch;
mod error;
mod options;
mod pool;

pub use batch::{BatchHandle, TaskFailure, TaskOutcome};
pub use error::{SchedError, SchedResult};
pub use options::SchedulerOptions;
pub use pool::Scheduler;
