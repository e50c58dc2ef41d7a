//! Scheduler error types: invalid arguments, per-task failures and the aggregate.

use std::error::Error as _;
use std::fmt;

/// Why a single dispatched task did not produce an output.
#[derive(Debug)]
pub enum TaskFailure<E> {
    /// The operation returned an error.
    Failed(E),
    /// The operation panicked (or its tokio task was cancelled by the runtime).
    Panicked(String),
}

/// A failure of one task, tagged with its position in the input sequence.
#[derive(Debug)]
pub struct TaskError<E> {
    /// Index of the task in the caller's input order.
    pub index: usize,
    pub failure: TaskFailure<E>,
}

impl<E> TaskError<E> {
    pub(crate) fn failed(index: usize, error: E) -> Self {
        Self {
            index,
            failure: TaskFailure::Failed(error),
        }
    }

    pub(crate) fn panicked(index: usize, message: String) -> Self {
        Self {
            index,
            failure: TaskFailure::Panicked(message),
        }
    }

    /// The operation's own error, if the task failed rather than panicked.
    pub fn error(&self) -> Option<&E> {
        match &self.failure {
            TaskFailure::Failed(e) => Some(e),
            TaskFailure::Panicked(_) => None,
        }
    }

    pub fn into_error(self) -> Option<E> {
        match self.failure {
            TaskFailure::Failed(e) => Some(e),
            TaskFailure::Panicked(_) => None,
        }
    }
}

// The operation's error is exposed through `source()`, not repeated here.
impl<E> fmt::Display for TaskError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.failure {
            TaskFailure::Failed(_) => write!(f, "task {} failed", self.index),
            TaskFailure::Panicked(msg) => write!(f, "task {} panicked: {}", self.index, msg),
        }
    }
}

impl<E> std::error::Error for TaskError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.failure {
            TaskFailure::Failed(e) => Some(e),
            TaskFailure::Panicked(_) => None,
        }
    }
}

/// Every task failure collected during one scheduler run, in completion order.
///
/// Never empty: the scheduler only builds one when at least one task failed.
/// `source()` is the first collected failure; iterate [`errors`](Self::errors)
/// for the rest.
#[derive(Debug)]
pub struct AggregateError<E> {
    errors: Vec<TaskError<E>>,
    total: usize,
}

impl<E> AggregateError<E> {
    pub(crate) fn new(errors: Vec<TaskError<E>>, total: usize) -> Self {
        debug_assert!(!errors.is_empty());
        Self { errors, total }
    }

    /// Collected failures in the order they completed (not input order).
    pub fn errors(&self) -> &[TaskError<E>] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<TaskError<E>> {
        self.errors
    }

    /// Number of failed tasks.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of tasks the run was started with.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Input indices of the failed tasks, sorted ascending.
    pub fn failed_indices(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = self.errors.iter().map(|e| e.index).collect();
        idx.sort_unstable();
        idx
    }
}

impl<E> fmt::Display for AggregateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} tasks failed", self.errors.len(), self.total)
    }
}

impl<E> std::error::Error for AggregateError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.errors
            .first()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Error returned by [`run_bounded`](super::run_bounded).
#[derive(Debug)]
pub enum ScheduleError<E> {
    /// `concurrency` was below 1; nothing was dispatched.
    InvalidArgument { concurrency: usize },
    /// One or more tasks failed; scheduling stopped after the first failure
    /// and all in-flight tasks were awaited.
    Aggregated(AggregateError<E>),
}

impl<E> ScheduleError<E> {
    /// The aggregated task failures, if this is not an argument error.
    pub fn aggregated(&self) -> Option<&AggregateError<E>> {
        match self {
            ScheduleError::Aggregated(agg) => Some(agg),
            ScheduleError::InvalidArgument { .. } => None,
        }
    }
}

impl<E> From<AggregateError<E>> for ScheduleError<E> {
    fn from(agg: AggregateError<E>) -> Self {
        ScheduleError::Aggregated(agg)
    }
}

impl<E> fmt::Display for ScheduleError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::InvalidArgument { concurrency } => {
                write!(f, "concurrency must be at least 1, got {}", concurrency)
            }
            ScheduleError::Aggregated(agg) => write!(f, "{}", agg),
        }
    }
}

impl<E> std::error::Error for ScheduleError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        // Aggregated displays as the aggregate itself, so skip a level.
        match self {
            ScheduleError::InvalidArgument { .. } => None,
            ScheduleError::Aggregated(agg) => agg.source(),
        }
    }
}
