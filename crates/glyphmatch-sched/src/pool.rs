//! Scheduler - fixed worker pool over a bounded job queue

use std::any::Any;
use std::fmt::Display;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

use crate::batch::{BatchHandle, TaskFailure};
use crate::error::{SchedError, SchedResult};
use crate::options::SchedulerOptions;

/// Queued unit of work; the flag tells it whether it was discarded
type Job = Box<dyn FnOnce(bool) + Send + 'static>;

/// Fixed-size worker pool
///
/// Workers are started by [`Scheduler::new`] and stopped by
/// [`Scheduler::shutdown`] (or on drop).
pub struct Scheduler {
    options: SchedulerOptions,
    queue: Mutex<Option<Sender<Job>>>,
    stopping: Arc<AtomicBool>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    exited: Receiver<()>,
}

impl Scheduler {
    /// Start `options.threads` workers
    pub fn new(options: SchedulerOptions) -> SchedResult<Self> {
        options.validate()?;
        let (job_tx, job_rx) = bounded::<Job>(options.queue_capacity);
        let (exit_tx, exit_rx) = unbounded::<()>();
        let stopping = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(options.threads);
        for i in 0..options.threads {
            let jobs = job_rx.clone();
            let exit = exit_tx.clone();
            let stopping = Arc::clone(&stopping);
            let handle = thread::Builder::new()
                .name(format!("glyphmatch-worker-{i}"))
                .spawn(move || {
                    while let Ok(job) = jobs.recv() {
                        job(stopping.load(Ordering::Acquire));
                    }
                    let _ = exit.send(());
                })?;
            workers.push(handle);
        }
        tracing::debug!(
            "scheduler started: {} workers, queue {}",
            options.threads,
            options.queue_capacity
        );

        Ok(Self {
            options,
            queue: Mutex::new(Some(job_tx)),
            stopping,
            workers: Mutex::new(workers),
            exited: exit_rx,
        })
    }

    pub fn options(&self) -> &SchedulerOptions {
        &self.options
    }

    /// True until [`shutdown`](Self::shutdown) is called
    pub fn is_running(&self) -> bool {
        !self.stopping.load(Ordering::Acquire)
    }

    /// Enqueue one job per input
    ///
    /// `work` receives the slot index and the input. An `Err` or a panic is
    /// recorded as that slot's [`TaskFailure`]. Blocks while the queue is
    /// full.
    ///
    /// # Errors
    ///
    /// Returns [`SchedError::Stopped`] if the scheduler has been shut down.
    /// Jobs enqueued before that still report to the handle.
    pub fn submit<T, R, E, F>(&self, inputs: Vec<T>, work: Arc<F>) -> SchedResult<BatchHandle<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        E: Display,
        F: Fn(usize, T) -> Result<R, E> + Send + Sync + 'static,
    {
        let queue = self
            .queue
            .lock()
            .map_err(|_| SchedError::LockPoisoned)?
            .clone()
            .ok_or(SchedError::Stopped)?;
        let total = inputs.len();
        let (result_tx, result_rx) = unbounded();

        for (index, input) in inputs.into_iter().enumerate() {
            let work = Arc::clone(&work);
            let results = result_tx.clone();
            let job: Job = Box::new(move |discarded| {
                let outcome = if discarded {
                    Err(TaskFailure::new(index, "discarded at shutdown"))
                } else {
                    match catch_unwind(AssertUnwindSafe(|| work(index, input))) {
                        Ok(Ok(value)) => Ok(value),
                        Ok(Err(e)) => Err(TaskFailure::new(index, e.to_string())),
                        Err(panic) => Err(TaskFailure::new(index, panic_message(panic.as_ref()))),
                    }
                };
                if let Err(failure) = &outcome {
                    tracing::warn!("{failure}");
                }
                // the handle may have been dropped
                let _ = results.send((index, outcome));
            });
            queue.send(job).map_err(|_| SchedError::Stopped)?;
        }
        Ok(BatchHandle::new(total, result_rx))
    }

    /// Stop the pool
    ///
    /// Queued jobs are discarded, running jobs get up to the configured
    /// shutdown timeout to finish. Returns the number of workers that did
    /// not exit in time; they are detached.
    pub fn shutdown(&self) -> SchedResult<usize> {
        if self.stopping.swap(true, Ordering::AcqRel) {
            return Ok(0);
        }
        // closing the queue ends each worker once it is drained
        self.queue.lock().map_err(|_| SchedError::LockPoisoned)?.take();

        let workers = std::mem::take(&mut *self.workers.lock().map_err(|_| SchedError::LockPoisoned)?);
        let deadline = Instant::now() + self.options.shutdown_timeout();
        let mut exited = 0;
        while exited < workers.len() {
            let left = deadline.saturating_duration_since(Instant::now());
            if left == Duration::ZERO || self.exited.recv_timeout(left).is_err() {
                break;
            }
            exited += 1;
        }
        let running = workers.len() - exited;
        if running == 0 {
            for handle in workers {
                let _ = handle.join();
            }
            tracing::debug!("scheduler stopped");
        } else {
            tracing::warn!("scheduler stopped with {running} workers still running");
        }
        Ok(running)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("options", &self.options)
            .field("running", &self.is_running())
            .finish()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_options() {
        assert!(Scheduler::new(SchedulerOptions::default().with_threads(0)).is_err());
    }

    #[test]
    fn test_submit_after_shutdown() {
        let s = Scheduler::new(SchedulerOptions::default().with_threads(1)).unwrap();
        assert!(s.is_running());
        assert_eq!(s.shutdown().unwrap(), 0);
        assert!(!s.is_running());
        let work = Arc::new(|_i: usize, x: u32| Ok::<u32, String>(x));
        assert!(matches!(s.submit(vec![1], work), Err(SchedError::Stopped)));
        // second shutdown is a no-op
        assert_eq!(s.shutdown().unwrap(), 0);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "panicked: boom");
    }
}
