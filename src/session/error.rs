//! Session operation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// No active (non-expired) session exists for the user.
    #[error("no active session for user {0}")]
    NoActiveSession(String),

    /// The session already reached a terminal stage; sessions are immutable
    /// after close.
    #[error("session {0} is closed")]
    SessionClosed(String),
}
