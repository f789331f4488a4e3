//! Pure validation gate: profanity detection and the per-user rate limit.
//!
//! No I/O here; callers feed in the stored state and the current time.

use chrono::{DateTime, Utc};

/// Outcome of the rate-limit check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Whole seconds left before the next comment is accepted; 0 when allowed.
    pub retry_after_secs: i64,
}

impl RateDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            retry_after_secs: 0,
        }
    }
}

/// Case-insensitive substring match against the configured word list.
///
/// Deliberately naive: there is no word-boundary logic, so a banned term
/// also matches inside a longer word. Empty or whitespace-only entries in
/// the list never match anything.
pub fn contains_profanity(text: &str, words: &[String]) -> bool {
    let lower = text.to_lowercase();
    words.iter().any(|word| {
        let term = word.trim().to_lowercase();
        !term.is_empty() && lower.contains(&term)
    })
}

/// Decide whether a user may comment again, given the time of their last
/// accepted comment. `now` is an explicit input so tests control the clock.
///
/// The remainder is truncated toward zero: a user 10.4s into a 120s window
/// is told to wait 109 more seconds, not 110.
pub fn allowed_by_rate_limit(
    last_comment_at: Option<DateTime<Utc>>,
    limit_secs: i64,
    now: DateTime<Utc>,
) -> RateDecision {
    let Some(last) = last_comment_at else {
        return RateDecision::allow();
    };

    let elapsed = (now - last).num_milliseconds() as f64 / 1000.0;
    if elapsed >= limit_secs as f64 {
        return RateDecision::allow();
    }

    RateDecision {
        allowed: false,
        retry_after_secs: (limit_secs as f64 - elapsed) as i64,
    }
}
