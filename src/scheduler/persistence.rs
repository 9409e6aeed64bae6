//! Storage capability consumed by the scheduler.
//!
//! Implemented outside this crate; the scheduler only reads eligibility
//! views and records deliveries. Schema and query implementation are the
//! implementer's concern.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::SchedulerResult;
use super::schedule::UserSchedule;

#[async_trait]
pub trait SchedulePersistence: Send + Sync {
    /// Users eligible for a scheduled prompt right now: onboarded, not
    /// paused, prompt time configured, not yet prompted today.
    async fn eligible_for_scheduled_prompt(&self) -> SchedulerResult<Vec<UserSchedule>>;

    /// Users whose local prompt time has already passed today without a
    /// send.
    async fn with_missed_prompt(&self) -> SchedulerResult<Vec<UserSchedule>>;

    /// Onboarded users whose `last_active` is older than `threshold_days`.
    async fn needing_reengagement(&self, threshold_days: i64) -> SchedulerResult<Vec<UserSchedule>>;

    /// Record that the scheduled prompt was delivered. `sent_on` is the
    /// user-local calendar date, computed by the scheduler so the store
    /// never needs its own timezone logic.
    async fn mark_prompt_sent(&self, user_id: &str, sent_on: NaiveDate) -> SchedulerResult<()>;
}
