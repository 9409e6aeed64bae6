//! Timezone resolution and prompt-time parsing.
//!
//! Every time-sensitive check in this crate is evaluated in the *user's*
//! zone (the one exception, the daily reengagement gate, is documented in
//! the scheduler). An unknown or missing zone name degrades to UTC rather
//! than dropping the user from scheduling.

use chrono::{DateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Resolve an IANA timezone name, falling back to UTC.
pub fn resolve_timezone(name: Option<&str>) -> Tz {
    let Some(raw) = name else {
        return Tz::UTC;
    };
    match raw.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            warn!(timezone = %raw, "Unknown timezone, falling back to UTC");
            Tz::UTC
        }
    }
}

/// The given instant in the user's configured zone.
pub fn zoned(now: DateTime<Utc>, timezone: Option<&str>) -> DateTime<Tz> {
    now.with_timezone(&resolve_timezone(timezone))
}

/// Parse a strict `"HH:MM"` prompt time.
///
/// Returns `None` for anything else; a user with an unparseable prompt time
/// is treated as ineligible for scheduling rather than raising.
pub fn parse_prompt_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}
