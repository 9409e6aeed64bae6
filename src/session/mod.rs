//! Session lifecycle: depth policy, stage machine, and the active-session
//! store.
//!
//! - **Depth policy** (`depth`) — pure functions: classify a message's
//!   engagement depth, detect continuation/early-close language, compute
//!   the current exchange ceiling.
//! - **Stage machine** (`stage`) — given a session and the depth-policy
//!   outputs, compute the next stage.
//! - **State** (`state`) — the per-session record and its timing rules.
//! - **Store** (`store`) — at most one active session per user; lazy expiry
//!   on read after 120 minutes of inactivity.
//!
//! The store exposes the three operations consumed by a message-handling
//! layer: `start_session`, `process_message`, and `close`.

mod depth;
mod error;
mod stage;
mod state;
mod store;

pub use depth::{
    classify_depth, exchange_ceiling, has_continuation_signal, has_early_close_signal,
    wants_to_continue, DepthSetting, ResponseDepth, HARD_EXCHANGE_CAP,
};
pub use error::SessionError;
pub use stage::{next_stage, SessionStage, StageTransition};
pub use state::{
    MessageRole, PromptKind, SessionConfig, SessionMessage, SessionState,
    SESSION_TIMEOUT_MINUTES,
};
pub use store::{ProcessOutcome, SessionStore, StartedSession};
