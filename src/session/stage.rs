//! Session stages and the transition function.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::depth::{wants_to_continue, ResponseDepth, HARD_EXCHANGE_CAP};
use super::state::SessionState;

// ============================================================================
// Stage
// ============================================================================

/// Stages of a session.
///
/// Normal flow is `Opener → Anchor → Probe ⇄ Connect → PreClose → Close`,
/// with `Ended` set after external close-out. The only permitted regression
/// is `PreClose → Probe` when the user extends past a soft close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStage {
    Opener,
    Anchor,
    Probe,
    Connect,
    PreClose,
    Close,
    Ended,
}

impl SessionStage {
    /// Sessions are immutable once they reach a terminal stage.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Close | Self::Ended)
    }
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Opener => "opener",
            Self::Anchor => "anchor",
            Self::Probe => "probe",
            Self::Connect => "connect",
            Self::PreClose => "pre_close",
            Self::Close => "close",
            Self::Ended => "ended",
        };
        f.write_str(s)
    }
}

// ============================================================================
// Transition
// ============================================================================

/// Outcome of evaluating the transition function for one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTransition {
    pub next: SessionStage,
    /// True when a soft close was extended (the caller increments
    /// `pre_close_count`, which grows the ceiling).
    pub extended: bool,
}

fn to(next: SessionStage) -> StageTransition {
    StageTransition {
        next,
        extended: false,
    }
}

/// Compute the next stage from the session's current state and the last
/// inbound message.
///
/// Pure with respect to the session: the caller applies the result. Calling
/// this for a session already in a terminal stage is a logic bug in this
/// crate, not an external fault.
pub fn next_stage(session: &SessionState, last_message: &str) -> StageTransition {
    debug_assert!(
        !session.stage.is_terminal(),
        "stage transition requested for terminal session {}",
        session.session_id
    );

    // Hard cap applies before any stage-specific rule.
    if session.exchange_count >= HARD_EXCHANGE_CAP {
        return to(SessionStage::Close);
    }

    let depth = session.last_response_depth;
    let exchanges = session.exchange_count;
    let ceiling = session.ceiling();

    match session.stage {
        SessionStage::Opener => to(SessionStage::Anchor),

        SessionStage::Anchor => to(SessionStage::Probe),

        SessionStage::Probe => {
            // Minimal engagement: one follow-up, then offer to close.
            if depth == ResponseDepth::Minimal && exchanges >= 2 {
                return to(SessionStage::PreClose);
            }
            // Short answers burn out faster than the configured ceiling.
            if depth == ResponseDepth::Short && exchanges >= ceiling.min(3) {
                return to(SessionStage::PreClose);
            }
            // Deep engagement on a returning user: surface a connection once.
            if depth == ResponseDepth::Long
                && exchanges >= 4
                && !session.is_first_session
                && !session.pattern_surfaced_this_session
            {
                return to(SessionStage::Connect);
            }
            if exchanges < ceiling {
                return to(SessionStage::Probe);
            }
            to(SessionStage::PreClose)
        }

        SessionStage::Connect => {
            if exchanges < ceiling {
                to(SessionStage::Probe)
            } else {
                to(SessionStage::PreClose)
            }
        }

        SessionStage::PreClose => {
            if wants_to_continue(last_message, depth) {
                StageTransition {
                    next: SessionStage::Probe,
                    extended: true,
                }
            } else {
                to(SessionStage::Close)
            }
        }

        SessionStage::Close | SessionStage::Ended => to(SessionStage::Close),
    }
}

// ============================================================================
// Tests
// ============================================================================
