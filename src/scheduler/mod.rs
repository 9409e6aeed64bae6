//! Prompt scheduling: decides *that* a user should be engaged now.
//!
//! ```text
//!  ┌─────────────────────┐   eligibility views    ┌──────────────────┐
//!  │ SchedulePersistence │◀───────────────────────│ PromptScheduler  │
//!  │     (injected)      │   mark_prompt_sent     │  one tokio task, │
//!  └─────────────────────┘                        │  fixed interval  │
//!  ┌─────────────────────┐   scheduled/catch-up/  └──────────────────┘
//!  │ NotificationChannel │◀──reengagement sends
//!  │     (injected)      │
//!  └─────────────────────┘
//! ```
//!
//! The scheduler only decides timing; starting a session in response to a
//! delivered prompt happens in the notification channel's implementation,
//! outside this module.

mod error;
mod notify;
mod persistence;
mod schedule;
mod service;

pub use error::{SchedulerError, SchedulerResult};
pub use notify::NotificationChannel;
pub use persistence::SchedulePersistence;
pub use schedule::UserSchedule;
pub use service::{PromptScheduler, SchedulerHandle};
