//! Per-user scheduling record, persisted externally and read by the
//! scheduler.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::parse_prompt_time;

/// One user's prompt schedule.
///
/// Invariant maintained across this crate: at most one scheduled prompt is
/// delivered per user per **user-local** calendar date, tracked in
/// `last_prompt_sent_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSchedule {
    pub user_id: String,

    /// IANA zone name; absent (or unknown) resolves to UTC.
    #[serde(default)]
    pub timezone: Option<String>,

    /// Local `"HH:MM"` delivery time; absent or malformed means the user is
    /// never scheduled.
    #[serde(default)]
    pub prompt_time: Option<String>,

    #[serde(default)]
    pub tracking_paused: bool,

    #[serde(default)]
    pub onboarding_complete: bool,

    pub last_active: DateTime<Utc>,

    /// User-local calendar date of the last delivered scheduled prompt.
    #[serde(default)]
    pub last_prompt_sent_date: Option<NaiveDate>,
}

impl UserSchedule {
    /// Whether this user can ever be scheduled. The per-day dedup is
    /// time-dependent and lives in the scheduler pass, not here.
    pub fn schedulable(&self) -> bool {
        self.onboarding_complete && !self.tracking_paused && self.prompt_time_parsed().is_some()
    }

    /// Parsed prompt time, if present and well-formed.
    pub fn prompt_time_parsed(&self) -> Option<NaiveTime> {
        self.prompt_time.as_deref().and_then(parse_prompt_time)
    }

    /// True once the prompt for the given user-local date was delivered.
    pub fn prompt_sent_on(&self, local_date: NaiveDate) -> bool {
        self.last_prompt_sent_date == Some(local_date)
    }
}
