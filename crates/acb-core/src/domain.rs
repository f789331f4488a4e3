use chrono::{DateTime, Utc};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Persisted per-user state, read before a comment is accepted.
///
/// Created implicitly by the first accepted comment (upsert); `Default`
/// therefore describes a user who has never commented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub last_comment_at: Option<DateTime<Utc>>,
    pub blocked: bool,
}
