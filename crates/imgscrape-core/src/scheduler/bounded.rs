//! Bounded-width task runner with ordered results and fail-fast aggregation.
//!
//! Keeps up to `concurrency` operations in flight on a `JoinSet`; when one
//! finishes, the next pending task is dispatched. The first observed failure
//! stops further dispatch, but tasks already running are awaited to
//! completion (no cancellation is sent into them).

use std::collections::HashMap;
use std::future::Future;

use tokio::task::{Id, JoinError, JoinSet};

use super::error::{AggregateError, ScheduleError, TaskError};

/// Phase of a single scheduler run (logged at debug level).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Scheduling,
    /// A failure was observed: no new dispatch, waiting for in-flight tasks.
    Draining,
}

/// Call-scoped bookkeeping for one run. Only the scheduler loop touches it,
/// so results and errors are never written from two places at once.
struct Run<O, E> {
    state: RunState,
    /// Slot table: in-flight tokio task id -> input index.
    slots: HashMap<Id, usize>,
    results: Vec<Option<O>>,
    errors: Vec<TaskError<E>>,
}

impl<O, E> Run<O, E> {
    fn new(total: usize, concurrency: usize) -> Self {
        let mut results = Vec::with_capacity(total);
        results.resize_with(total, || None);
        Self {
            state: RunState::Scheduling,
            slots: HashMap::with_capacity(concurrency.min(total)),
            results,
            errors: Vec::new(),
        }
    }

    fn release(&mut self, id: Id) -> usize {
        self.slots
            .remove(&id)
            .expect("completed task must own a slot")
    }

    fn record(&mut self, joined: Result<(Id, Result<O, E>), JoinError>) {
        match joined {
            Ok((id, Ok(output))) => {
                let index = self.release(id);
                debug_assert!(self.results[index].is_none(), "index written twice");
                self.results[index] = Some(output);
                tracing::trace!(index, "task succeeded");
            }
            Ok((id, Err(error))) => {
                let index = self.release(id);
                tracing::debug!(index, "task failed");
                self.errors.push(TaskError::failed(index, error));
            }
            Err(join_err) => {
                let index = self.release(join_err.id());
                let message = join_failure_message(join_err);
                tracing::warn!(index, %message, "task panicked");
                self.errors.push(TaskError::panicked(index, message));
            }
        }
        if !self.errors.is_empty() && self.state == RunState::Scheduling {
            self.state = RunState::Draining;
            tracing::debug!(in_flight = self.slots.len(), "failure observed; draining");
        }
    }
}

/// Runs `operation` over every element of `tasks` with at most `concurrency`
/// operations in flight, returning outputs in input order.
///
/// - `concurrency == 0` fails with [`ScheduleError::InvalidArgument`] before
///   anything is dispatched.
/// - Empty `tasks` returns an empty vector without calling `operation`.
/// - `operation` is called exactly once per dispatched task, from this
///   function's own loop, and the returned future is spawned on the current
///   tokio runtime.
/// - Once a task fails (or panics), no new task is dispatched; tasks already
///   in flight run to completion. The run then fails with
///   [`ScheduleError::Aggregated`] holding every collected failure in
///   completion order.
///
/// Dropping the returned future aborts whatever is still in flight.
pub async fn run_bounded<T, O, E, F, Fut>(
    concurrency: usize,
    tasks: impl IntoIterator<Item = T>,
    mut operation: F,
) -> Result<Vec<O>, ScheduleError<E>>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
    O: Send + 'static,
    E: Send + 'static,
{
    if concurrency < 1 {
        return Err(ScheduleError::InvalidArgument { concurrency });
    }

    let tasks: Vec<T> = tasks.into_iter().collect();
    let total = tasks.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let mut run: Run<O, E> = Run::new(total, concurrency);
    let mut pending = tasks.into_iter().enumerate();
    let mut join_set = JoinSet::new();
    tracing::debug!(total, concurrency, "scheduler started");

    loop {
        if run.state == RunState::Scheduling {
            while join_set.len() < concurrency {
                let Some((index, task)) = pending.next() else {
                    break;
                };
                let handle = join_set.spawn(operation(task));
                run.slots.insert(handle.id(), index);
                tracing::trace!(index, in_flight = join_set.len(), "task dispatched");
            }
        }

        let Some(joined) = join_set.join_next_with_id().await else {
            break;
        };
        run.record(joined);
    }

    if !run.errors.is_empty() {
        let undispatched = pending.len();
        tracing::debug!(
            failed = run.errors.len(),
            undispatched,
            "scheduler finished with failures"
        );
        return Err(AggregateError::new(run.errors, total).into());
    }

    let results: Vec<O> = run.results.into_iter().flatten().collect();
    debug_assert_eq!(results.len(), total, "every task must have produced an output");
    tracing::debug!(total, "scheduler finished");
    Ok(results)
}

fn join_failure_message(err: JoinError) -> String {
    if !err.is_panic() {
        return "task cancelled".to_string();
    }
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
