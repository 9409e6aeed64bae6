//! Delivery capability consumed by the scheduler.

use async_trait::async_trait;

use super::error::SchedulerResult;
use super::schedule::UserSchedule;

/// Notification delivery callbacks.
///
/// Each send is awaited by the scheduler within its tick; retries,
/// fallbacks, and message wording are the implementer's concern. A slow
/// implementation delays the remaining users in the same pass but never a
/// future tick.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Deliver the user's daily prompt at their configured local time.
    async fn send_scheduled_prompt(&self, user: &UserSchedule) -> SchedulerResult<()>;

    /// Deliver a late prompt after a missed wake-up. `hours_late` is how
    /// far past the user's local prompt time the send happens; implementers
    /// may soften the wording as it grows.
    async fn send_catch_up_prompt(&self, user: &UserSchedule, hours_late: f64)
        -> SchedulerResult<()>;

    /// Nudge a user who has been inactive past the reengagement threshold.
    async fn send_reengagement_prompt(&self, user: &UserSchedule) -> SchedulerResult<()>;
}
