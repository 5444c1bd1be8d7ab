//! Batch handles and per-task outcomes

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use thiserror::Error;

use crate::error::{SchedError, SchedResult};

/// Failure of one task, attached to its slot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task {index} failed: {message}")]
pub struct TaskFailure {
    /// Slot index of the task in its batch
    pub index: usize,
    pub message: String,
}

impl TaskFailure {
    pub fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }
}

/// Result of one task
pub type TaskOutcome<R> = Result<R, TaskFailure>;

/// Handle to a submitted batch
///
/// Dropping the handle abandons the batch; its jobs still run to
/// completion and their results are discarded.
#[derive(Debug)]
pub struct BatchHandle<R> {
    total: usize,
    results: Receiver<(usize, TaskOutcome<R>)>,
}

impl<R> BatchHandle<R> {
    pub(crate) fn new(total: usize, results: Receiver<(usize, TaskOutcome<R>)>) -> Self {
        Self { total, results }
    }

    /// Number of tasks in the batch
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Wait for every task and return their outcomes in submission order
    ///
    /// # Errors
    ///
    /// Returns [`SchedError::AllTasksFailed`] if the batch is not empty and
    /// no task succeeded.
    pub fn await_all(self) -> SchedResult<Vec<TaskOutcome<R>>> {
        self.collect(None)
    }

    /// Like [`await_all`](Self::await_all), giving up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`SchedError::Timeout`] when the wait expires. Running tasks
    /// are not interrupted.
    pub fn await_all_timeout(self, timeout: Duration) -> SchedResult<Vec<TaskOutcome<R>>> {
        self.collect(Some(Instant::now() + timeout))
    }

    fn collect(self, deadline: Option<Instant>) -> SchedResult<Vec<TaskOutcome<R>>> {
        let mut slots: Vec<Option<TaskOutcome<R>>> = (0..self.total).map(|_| None).collect();
        let mut completed = 0;
        while completed < self.total {
            let received = match deadline {
                Some(deadline) => match self.results.recv_deadline(deadline) {
                    Ok(message) => message,
                    Err(RecvTimeoutError::Timeout) => {
                        return Err(SchedError::Timeout {
                            completed,
                            total: self.total,
                        });
                    }
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match self.results.recv() {
                    Ok(message) => message,
                    Err(_) => break,
                },
            };
            let (index, outcome) = received;
            if let Some(slot) = slots.get_mut(index).filter(|s| s.is_none()) {
                *slot = Some(outcome);
                completed += 1;
            }
        }

        let outcomes: Vec<TaskOutcome<R>> = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| slot.unwrap_or_else(|| Err(TaskFailure::new(i, "task result lost"))))
            .collect();
        if !outcomes.is_empty() && outcomes.iter().all(|o| o.is_err()) {
            let first = outcomes
                .iter()
                .find_map(|o| o.as_ref().err().cloned())
                .unwrap_or_else(|| TaskFailure::new(0, "unknown"));
            return Err(SchedError::AllTasksFailed {
                count: outcomes.len(),
                first,
            });
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_out_of_order_results() {
        let (tx, rx) = unbounded();
        tx.send((2, Ok(30))).unwrap();
        tx.send((0, Ok(10))).unwrap();
        tx.send((1, Err(TaskFailure::new(1, "bad")))).unwrap();
        let outcomes = BatchHandle::new(3, rx).await_all().unwrap();
        assert_eq!(outcomes, vec![Ok(10), Err(TaskFailure::new(1, "bad")), Ok(30)]);
    }

    #[test]
    fn test_lost_results() {
        let (tx, rx) = unbounded::<(usize, TaskOutcome<u32>)>();
        tx.send((0, Ok(1))).unwrap();
        drop(tx);
        let outcomes = BatchHandle::new(2, rx).await_all().unwrap();
        assert_eq!(outcomes[0], Ok(1));
        assert!(outcomes[1].is_err());
    }

    #[test]
    fn test_all_failed() {
        let (tx, rx) = unbounded::<(usize, TaskOutcome<u32>)>();
        tx.send((0, Err(TaskFailure::new(0, "x")))).unwrap();
        tx.send((1, Err(TaskFailure::new(1, "y")))).unwrap();
        match BatchHandle::new(2, rx).await_all() {
            Err(SchedError::AllTasksFailed { count, first }) => {
                assert_eq!(count, 2);
                assert_eq!(first.index, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_timeout() {
        let (_tx, rx) = unbounded::<(usize, TaskOutcome<u32>)>();
        let err = BatchHandle::new(1, rx).await_all_timeout(Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, SchedError::Timeout { completed: 0, total: 1 }));
    }

    #[test]
    fn test_empty_batch() {
        let (_tx, rx) = unbounded::<(usize, TaskOutcome<u32>)>();
        assert!(BatchHandle::new(0, rx).await_all().unwrap().is_empty());
    }
}
