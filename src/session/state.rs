//! In-memory state of one active session.
//!
//! Persisted data lives behind the external persistence capability; this is
//! only what the state machine and the responder context need while the
//! conversation is open.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::depth::{exchange_ceiling, DepthSetting, ResponseDepth};
use super::stage::SessionStage;

/// Sessions expire after this much inactivity.
pub const SESSION_TIMEOUT_MINUTES: i64 = 120;

/// Prefix for generated session IDs.
const SESSION_ID_PREFIX: &str = "session_";

// ============================================================================
// Types
// ============================================================================

/// Why a session was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Scheduled,
    CatchUp,
    Reengagement,
    Manual,
}

/// Per-session configuration, immutable for the session's life.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Opaque tag consumed by the external responder.
    pub personality: String,
    pub depth_setting: DepthSetting,
    pub is_first_session: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// State of one active session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub user_id: String,

    // Immutable configuration.
    pub personality: String,
    pub depth_setting: DepthSetting,
    pub is_first_session: bool,
    pub prompt_kind: PromptKind,

    // Mutable conversation state.
    pub stage: SessionStage,
    pub exchange_count: u32,
    pub last_response_depth: ResponseDepth,
    pub pre_close_count: u32,
    pub theme_identified: Option<String>,
    pub pattern_surfaced_this_session: bool,
    /// Opaque payloads accumulated by the external extractor; never
    /// interpreted here.
    pub extracted_items: Vec<serde_json::Value>,
    pub messages: Vec<SessionMessage>,

    // Timing.
    pub created_at: DateTime<Utc>,
    /// Advances only on inbound user messages.
    pub last_activity: DateTime<Utc>,
}

// ============================================================================
// Implementation
// ============================================================================

impl SessionState {
    pub fn new(
        user_id: &str,
        config: SessionConfig,
        prompt_kind: PromptKind,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: format!("{}{}", SESSION_ID_PREFIX, Ulid::new()),
            user_id: user_id.to_string(),
            personality: config.personality,
            depth_setting: config.depth_setting,
            is_first_session: config.is_first_session,
            prompt_kind,
            stage: SessionStage::Opener,
            exchange_count: 0,
            last_response_depth: ResponseDepth::Medium,
            pre_close_count: 0,
            theme_identified: None,
            pattern_surfaced_this_session: false,
            extracted_items: Vec::new(),
            messages: Vec::new(),
            created_at: now,
            last_activity: now,
        }
    }

    /// Whether the session has passed its inactivity window.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.last_activity > Duration::minutes(SESSION_TIMEOUT_MINUTES)
    }

    /// Refresh the inactivity window. Inbound messages only.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    /// Record an inbound user message: history, depth, exchange count, and
    /// the activity window all advance.
    pub fn record_user_message(&mut self, content: &str, depth: ResponseDepth, now: DateTime<Utc>) {
        self.messages.push(SessionMessage {
            role: MessageRole::User,
            content: content.to_string(),
            timestamp: now,
        });
        self.last_response_depth = depth;
        self.exchange_count += 1;
        self.touch(now);
    }

    /// Record an outbound reply. Outbound traffic never extends the
    /// inactivity window.
    pub fn record_assistant_message(&mut self, content: &str, now: DateTime<Utc>) {
        self.messages.push(SessionMessage {
            role: MessageRole::Assistant,
            content: content.to_string(),
            timestamp: now,
        });
    }

    /// Last `n` messages, for the external responder's context window.
    pub fn recent_context(&self, n: usize) -> &[SessionMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Current exchange ceiling given accumulated soft-close extensions.
    pub fn ceiling(&self) -> u32 {
        exchange_ceiling(
            self.depth_setting,
            self.is_first_session,
            self.pre_close_count,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
