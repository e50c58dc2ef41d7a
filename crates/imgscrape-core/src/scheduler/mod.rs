//! Bounded task scheduler.
//!
//! Runs many independent async operations over a fixed number of slots,
//! returns outputs in input order, and stops starting new work after the
//! first failure while letting running work finish.

mod bounded;
mod error;

pub use bounded::run_bounded;
pub use error::{AggregateError, ScheduleError, TaskError, TaskFailure};

#[cfg(test)]
mod tests;
