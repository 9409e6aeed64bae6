//! Scheduler error types.

use thiserror::Error;

/// Errors surfaced by the scheduler's capability boundaries.
///
/// These are degrade-and-continue by policy: a failure for one user is
/// logged and that user is skipped for the current pass; nothing is ever
/// allowed to end a tick.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("delivery error: {0}")]
    Delivery(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
