//! Persistence port for user state and comment history.

mod memory;

pub use memory::{MemoryStore, StoredComment};

use async_trait::async_trait;

use crate::domain::{UserId, UserRecord};

/// Failures of the persistence layer, discriminated so callers can branch
/// on taxonomy instead of string-matching messages.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store was used outside its open lifecycle (before startup
    /// finished, or after shutdown). Always a caller bug.
    #[error("store not initialized")]
    NotInitialized,

    /// The store is unreachable; retryable, surfaced to the user as a
    /// generic delivery failure.
    #[error("store unreachable: {0}")]
    Connectivity(String),

    /// A schema constraint rejected the write. Unexpected in normal
    /// operation.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("store error: {0}")]
    Other(String),
}

#[async_trait]
pub trait UserRecordStore: Send + Sync {
    /// Single-row read of a user's last comment time and blocked flag.
    /// `None` means the user has never commented (not an error).
    async fn fetch(&self, user: UserId) -> Result<Option<UserRecord>, StoreError>;

    /// Atomically insert a comment and bump the user's `last_comment_at`
    /// to the current time (upsert keyed on user id, so a user never has
    /// two rows). Either both writes commit or neither does.
    async fn save_comment(
        &self,
        target: &str,
        text: &str,
        user: UserId,
    ) -> Result<(), StoreError>;
}
