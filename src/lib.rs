//! daybook — session and scheduling core for a conversational journaling
//! companion.
//!
//! The crate decides, per user and independently of all others, *when* to
//! start a short structured conversation, *how long* to keep it open as the
//! exchange unfolds, and *when* to end it — across arbitrary timezones,
//! missed wake-ups, and restarts.
//!
//! # Architecture
//!
//! ```text
//!  ┌─────────────────┐  engage now   ┌──────────────────────┐
//!  │ PromptScheduler │──────────────▶│ NotificationChannel  │  (injected)
//!  │  (one bg loop)  │               └──────────────────────┘
//!  └────────┬────────┘                          │ starts a session
//!           │ reads                             ▼
//!  ┌─────────────────────┐          ┌──────────────────────┐
//!  │ SchedulePersistence │          │    SessionStore      │  one active
//!  │     (injected)      │          │  (per-user sessions) │  session/user
//!  └─────────────────────┘          └──────────┬───────────┘
//!                                              │ inbound messages
//!                                              ▼
//!                                   ┌──────────────────────┐
//!                                   │ stage transition fn  │  Opener → … → Close
//!                                   │   + depth policy     │
//!                                   └──────────────────────┘
//! ```
//!
//! Reply generation, belief extraction, and storage schemas live behind the
//! injected capability traits; this crate owns only the state machine and
//! the timing semantics.

pub mod clock;
pub mod config;
pub mod scheduler;
pub mod session;

pub use config::{Config, ConfigError, SchedulerSettings};
pub use scheduler::{
    NotificationChannel, PromptScheduler, SchedulePersistence, SchedulerError, SchedulerHandle,
    UserSchedule,
};
pub use session::{
    DepthSetting, ProcessOutcome, PromptKind, ResponseDepth, SessionConfig, SessionError,
    SessionStage, SessionState, SessionStore, StartedSession,
};
