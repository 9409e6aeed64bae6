//! In-memory store of active sessions, at most one per user.
//!
//! An explicit object rather than module-level state, so embedders and
//! tests can run independent instances. Expiry is lazy: a session past its
//! inactivity window is evicted the next time it is read, which is the only
//! expiry mechanism.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use super::depth::classify_depth;
use super::error::SessionError;
use super::stage::{next_stage, SessionStage};
use super::state::{PromptKind, SessionConfig, SessionState};

// ============================================================================
// Results
// ============================================================================

/// Result of installing a new session.
#[derive(Debug, Clone)]
pub struct StartedSession {
    pub session: SessionState,
    /// A prior active session displaced by this start, already marked
    /// `Ended`. Returned so the caller can run close-out on it instead of
    /// losing its extracted data.
    pub displaced: Option<SessionState>,
}

/// Outcome of processing one inbound message.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// Snapshot of the session after the message was applied.
    pub session: SessionState,
    pub next_stage: SessionStage,
}

// ============================================================================
// Store
// ============================================================================

/// The active-session map.
///
/// Safe to share across tasks: every operation goes through the concurrent
/// map, including the read-side eviction in [`SessionStore::get_active`].
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Get the user's active session, evicting it first if expired.
    pub fn get_active(&self, user_id: &str, now: DateTime<Utc>) -> Option<SessionState> {
        let expired = match self.sessions.get(user_id) {
            Some(entry) => entry.is_expired(now),
            None => return None,
        };

        if expired {
            if let Some((_, session)) = self.sessions.remove(user_id) {
                info!(
                    session_id = %session.session_id,
                    user_id = %user_id,
                    "Session expired"
                );
            }
            return None;
        }

        self.sessions.get(user_id).map(|entry| entry.clone())
    }

    /// Install a new session for the user.
    ///
    /// Any prior entry is detached, marked `Ended`, and handed back in
    /// [`StartedSession::displaced`] for the caller's close-out.
    pub fn start_session(
        &self,
        user_id: &str,
        config: SessionConfig,
        prompt_kind: PromptKind,
        now: DateTime<Utc>,
    ) -> StartedSession {
        let session = SessionState::new(user_id, config, prompt_kind, now);

        let displaced = self
            .sessions
            .insert(user_id.to_string(), session.clone())
            .map(|mut prior| {
                warn!(
                    session_id = %prior.session_id,
                    user_id = %user_id,
                    "Displacing prior active session"
                );
                prior.stage = SessionStage::Ended;
                prior
            });

        info!(
            session_id = %session.session_id,
            user_id = %user_id,
            kind = ?prompt_kind,
            "Created session"
        );

        StartedSession { session, displaced }
    }

    /// Advance the session with one inbound user message.
    ///
    /// Classifies depth, appends the message, bumps the exchange count,
    /// refreshes the activity window, and applies the stage transition.
    /// When the returned stage is `Close`, the caller detaches the session
    /// via [`SessionStore::close`] and runs its close-out side effects.
    pub fn process_message(
        &self,
        user_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<ProcessOutcome, SessionError> {
        // Lazy eviction first so an expired session is never advanced.
        if self.get_active(user_id, now).is_none() {
            return Err(SessionError::NoActiveSession(user_id.to_string()));
        }

        let mut entry = self
            .sessions
            .get_mut(user_id)
            .ok_or_else(|| SessionError::NoActiveSession(user_id.to_string()))?;

        if entry.stage.is_terminal() {
            return Err(SessionError::SessionClosed(entry.session_id.clone()));
        }

        let depth = classify_depth(text);
        entry.record_user_message(text, depth, now);

        let transition = next_stage(&entry, text);
        if transition.next == SessionStage::Connect {
            // At most one connection is surfaced per session.
            entry.pattern_surfaced_this_session = true;
        }
        if transition.extended {
            entry.pre_close_count += 1;
            debug!(
                session_id = %entry.session_id,
                pre_close_count = entry.pre_close_count,
                ceiling = entry.ceiling(),
                "Session extended past soft close"
            );
        }
        entry.stage = transition.next;

        Ok(ProcessOutcome {
            session: entry.clone(),
            next_stage: transition.next,
        })
    }

    /// Append an outbound reply to the session history.
    ///
    /// Does not advance the stage, the exchange count, or the activity
    /// window.
    pub fn record_assistant_message(
        &self,
        user_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        let mut entry = self
            .sessions
            .get_mut(user_id)
            .ok_or_else(|| SessionError::NoActiveSession(user_id.to_string()))?;
        entry.record_assistant_message(text, now);
        Ok(())
    }

    /// Append an extractor payload to the session.
    ///
    /// Payloads are opaque here; they ride along in the session and come
    /// back in the close-out snapshot for the caller to persist.
    pub fn append_extracted(
        &self,
        user_id: &str,
        item: serde_json::Value,
    ) -> Result<(), SessionError> {
        let mut entry = self
            .sessions
            .get_mut(user_id)
            .ok_or_else(|| SessionError::NoActiveSession(user_id.to_string()))?;
        entry.extracted_items.push(item);
        Ok(())
    }

    /// Record the theme identified for this session.
    pub fn set_theme(&self, user_id: &str, theme: &str) -> Result<(), SessionError> {
        let mut entry = self
            .sessions
            .get_mut(user_id)
            .ok_or_else(|| SessionError::NoActiveSession(user_id.to_string()))?;
        entry.theme_identified = Some(theme.to_string());
        Ok(())
    }

    /// Detach and return the session without marking it ended.
    ///
    /// The store performs no persistence; the caller owns close-out.
    pub fn remove(&self, user_id: &str) -> Option<SessionState> {
        self.sessions.remove(user_id).map(|(_, session)| session)
    }

    /// Detach the session and mark it `Ended`, returning the final snapshot
    /// for the caller to persist and extract from.
    pub fn close(&self, user_id: &str) -> Option<SessionState> {
        self.remove(user_id).map(|mut session| {
            session.stage = SessionStage::Ended;
            info!(
                session_id = %session.session_id,
                user_id = %user_id,
                exchanges = session.exchange_count,
                "Ended session"
            );
            session
        })
    }

    /// Number of sessions currently held (including not-yet-evicted expired
    /// ones).
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
