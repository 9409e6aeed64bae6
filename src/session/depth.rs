//! Depth policy: pure functions over message text and session counters.
//!
//! Everything here is deterministic and side-effect free: how deeply a user
//! is engaging (word count), whether they are signalling to keep talking or
//! to wrap up, and how many exchanges the session may run before being
//! pushed toward a close.

use serde::{Deserialize, Serialize};

/// Hard cap on exchanges, regardless of setting or extensions.
pub const HARD_EXCHANGE_CAP: u32 = 15;

/// How much the ceiling grows each time the user extends past a soft close.
const EXTENSION_INCREMENT: u32 = 3;

/// First sessions are kept short regardless of the configured depth.
const FIRST_SESSION_CAP: u32 = 4;

/// Lexical evidence that the user wants to keep talking past a soft close.
const CONTINUATION_PHRASES: &[&str] =
    &["also", "actually", "one more thing", "speaking of that"];

/// Lexical evidence that the user wants to end the session now.
const EARLY_CLOSE_PHRASES: &[&str] = &[
    "goodnight",
    "good night",
    "gotta go",
    "i'm done",
    "im done",
    "that's all",
    "thats all",
    "goodbye",
    "bye",
];

// ============================================================================
// Types
// ============================================================================

/// How deeply the user engaged in their last message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseDepth {
    Minimal,
    Short,
    Medium,
    Long,
}

/// The user's configured session depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthSetting {
    Quick,
    #[default]
    Standard,
    Deep,
}

impl DepthSetting {
    /// Parse a stored setting string; unknown values fall back to Standard.
    pub fn from_str_lossy(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "quick" => Self::Quick,
            "deep" => Self::Deep,
            _ => Self::Standard,
        }
    }

    fn base_ceiling(self) -> u32 {
        match self {
            Self::Quick => 3,
            Self::Standard => 6,
            Self::Deep => 10,
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Classify engagement depth by word count (whitespace split).
pub fn classify_depth(text: &str) -> ResponseDepth {
    let words = text.split_whitespace().count();
    if words <= 3 {
        ResponseDepth::Minimal
    } else if words < 20 {
        ResponseDepth::Short
    } else if words < 100 {
        ResponseDepth::Medium
    } else {
        ResponseDepth::Long
    }
}

/// Structural or lexical evidence the user wants to keep talking:
/// a trailing question mark or a continuation phrase.
pub fn has_continuation_signal(text: &str) -> bool {
    let lowered = text.to_lowercase();
    if lowered.trim_end().ends_with('?') {
        return true;
    }
    CONTINUATION_PHRASES.iter().any(|p| lowered.contains(p))
}

/// Lexical evidence the user wants to end the session immediately.
pub fn has_early_close_signal(text: &str) -> bool {
    let lowered = text.to_lowercase();
    EARLY_CLOSE_PHRASES.iter().any(|p| lowered.contains(p))
}

/// The continuation test evaluated at a soft close.
///
/// Early-close language wins over everything else; a continuation signal
/// wins over depth; otherwise medium/long replies keep the session open.
pub fn wants_to_continue(text: &str, depth: ResponseDepth) -> bool {
    if has_early_close_signal(text) {
        return false;
    }
    if has_continuation_signal(text) {
        return true;
    }
    matches!(depth, ResponseDepth::Medium | ResponseDepth::Long)
}

// ============================================================================
// Ceiling
// ============================================================================

/// Current exchange ceiling.
///
/// The ceiling grows by a fixed increment each time the user extends past a
/// soft close, bounded by the hard cap, so an engaged conversation can run
/// long without becoming unbounded. First sessions stay capped at
/// [`FIRST_SESSION_CAP`] even when extended.
pub fn exchange_ceiling(setting: DepthSetting, is_first_session: bool, pre_close_count: u32) -> u32 {
    let mut base = setting.base_ceiling();
    if is_first_session {
        base = base.min(FIRST_SESSION_CAP);
    }
    let mut ceiling = base
        .saturating_add(EXTENSION_INCREMENT.saturating_mul(pre_close_count))
        .min(HARD_EXCHANGE_CAP);
    if is_first_session {
        ceiling = ceiling.min(FIRST_SESSION_CAP);
    }
    ceiling
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn depth_boundaries_are_exact() {
        assert_eq!(classify_depth(&words(3)), ResponseDepth::Minimal);
        assert_eq!(classify_depth(&words(4)), ResponseDepth::Short);
        assert_eq!(classify_depth(&words(19)), ResponseDepth::Short);
        assert_eq!(classify_depth(&words(20)), ResponseDepth::Medium);
        assert_eq!(classify_depth(&words(99)), ResponseDepth::Medium);
        assert_eq!(classify_depth(&words(100)), ResponseDepth::Long);
    }

    #[test]
    fn empty_message_is_minimal() {
        assert_eq!(classify_depth(""), ResponseDepth::Minimal);
        assert_eq!(classify_depth("   "), ResponseDepth::Minimal);
    }

    #[test]
    fn trailing_question_mark_is_a_continuation_signal() {
        assert!(has_continuation_signal("but what happened next?"));
        assert!(has_continuation_signal("why?  "));
        assert!(!has_continuation_signal("that was it."));
    }

    #[test]
    fn continuation_phrases_match_case_insensitively() {
        assert!(has_continuation_signal("Actually, one more thing"));
        assert!(has_continuation_signal("ALSO I forgot to mention"));
        assert!(has_continuation_signal("speaking of that, my sister called"));
    }

    #[test]
    fn early_close_phrases_match_case_insensitively() {
        assert!(has_early_close_signal("Goodnight!"));
        assert!(has_early_close_signal("ok gotta go"));
        assert!(has_early_close_signal("I'm done for today"));
        assert!(has_early_close_signal("that's all"));
        assert!(!has_early_close_signal("the day went fine"));
    }

    #[test]
    fn early_close_wins_over_continuation() {
        // Trailing "?" would normally continue, but early-close wins first.
        assert!(!wants_to_continue(
            "gotta go, talk tomorrow?",
            ResponseDepth::Long
        ));
    }

    #[test]
    fn continuation_signal_wins_over_shallow_depth() {
        assert!(wants_to_continue(
            "actually, one more thing",
            ResponseDepth::Short
        ));
    }

    #[test]
    fn depth_alone_decides_without_signals() {
        assert!(wants_to_continue("it reminded me of my dad and the lake house we used to visit every summer", ResponseDepth::Medium));
        assert!(!wants_to_continue("not much", ResponseDepth::Minimal));
        assert!(!wants_to_continue("it was an ordinary day really", ResponseDepth::Short));
    }

    #[test]
    fn ceiling_bases_per_setting() {
        assert_eq!(exchange_ceiling(DepthSetting::Quick, false, 0), 3);
        assert_eq!(exchange_ceiling(DepthSetting::Standard, false, 0), 6);
        assert_eq!(exchange_ceiling(DepthSetting::Deep, false, 0), 10);
    }

    #[test]
    fn ceiling_grows_with_extensions_up_to_hard_cap() {
        for setting in [DepthSetting::Quick, DepthSetting::Standard, DepthSetting::Deep] {
            for pre_close in 0..8u32 {
                let expected =
                    (setting.base_ceiling() + 3 * pre_close).min(HARD_EXCHANGE_CAP);
                assert_eq!(exchange_ceiling(setting, false, pre_close), expected);
            }
        }
        assert_eq!(exchange_ceiling(DepthSetting::Deep, false, 100), 15);
    }

    #[test]
    fn first_session_ceiling_never_exceeds_four() {
        for setting in [DepthSetting::Quick, DepthSetting::Standard, DepthSetting::Deep] {
            for pre_close in 0..8u32 {
                assert!(exchange_ceiling(setting, true, pre_close) <= 4);
            }
        }
        // Quick stays below the first-session cap.
        assert_eq!(exchange_ceiling(DepthSetting::Quick, true, 0), 3);
        assert_eq!(exchange_ceiling(DepthSetting::Deep, true, 0), 4);
    }

    #[test]
    fn unknown_setting_falls_back_to_standard() {
        assert_eq!(DepthSetting::from_str_lossy("quick"), DepthSetting::Quick);
        assert_eq!(DepthSetting::from_str_lossy("DEEP"), DepthSetting::Deep);
        assert_eq!(
            DepthSetting::from_str_lossy("bottomless"),
            DepthSetting::Standard
        );
    }
}
