use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{UserId, UserRecord};
use crate::store::{StoreError, UserRecordStore};

/// A comment as captured by the in-memory store.
#[derive(Clone, Debug)]
pub struct StoredComment {
    pub target: String,
    pub text: String,
    pub from_user: UserId,
    pub created_at: DateTime<Utc>,
}

/// In-process implementation of the store port, for tests and local runs
/// without a database.
///
/// Both writes of `save_comment` happen under one lock, which gives the
/// same all-or-nothing guarantee the Postgres adapter gets from a
/// transaction.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, UserRecord>,
    comments: Vec<StoredComment>,
    fail_saves: bool,
    fail_fetches: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a user row, e.g. a blocked user or one with a recent
    /// comment timestamp.
    pub async fn seed_user(&self, user: UserId, record: UserRecord) {
        self.inner.lock().await.users.insert(user, record);
    }

    /// Make subsequent `save_comment` calls fail with a connectivity error.
    pub async fn fail_saves(&self, fail: bool) {
        self.inner.lock().await.fail_saves = fail;
    }

    /// Make subsequent `fetch` calls fail with a connectivity error.
    pub async fn fail_fetches(&self, fail: bool) {
        self.inner.lock().await.fail_fetches = fail;
    }

    pub async fn comments(&self) -> Vec<StoredComment> {
        self.inner.lock().await.comments.clone()
    }

    pub async fn user(&self, user: UserId) -> Option<UserRecord> {
        self.inner.lock().await.users.get(&user).copied()
    }
}

#[async_trait]
impl UserRecordStore for MemoryStore {
    async fn fetch(&self, user: UserId) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.inner.lock().await;
        if inner.fail_fetches {
            return Err(StoreError::Connectivity("simulated outage".to_string()));
        }
        Ok(inner.users.get(&user).copied())
    }

    async fn save_comment(
        &self,
        target: &str,
        text: &str,
        user: UserId,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_saves {
            return Err(StoreError::Connectivity("simulated outage".to_string()));
        }

        let now = Utc::now();
        inner.comments.push(StoredComment {
            target: target.to_string(),
            text: text.to_string(),
            from_user: user,
            created_at: now,
        });
        let entry = inner.users.entry(user).or_default();
        entry.last_comment_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn save_creates_the_user_row_and_the_comment_together() {
        let store = MemoryStore::new();
        let user = UserId(1);

        store.save_comment("A", "hello", user).await.unwrap();

        let comments = store.comments().await;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].target, "A");
        assert_eq!(comments[0].text, "hello");

        let record = store.fetch(user).await.unwrap().unwrap();
        assert!(record.last_comment_at.is_some());
        assert!(!record.blocked);
    }

    #[tokio::test]
    async fn failed_save_leaves_no_partial_state() {
        let store = MemoryStore::new();
        let user = UserId(1);
        store.fail_saves(true).await;

        let err = store.save_comment("A", "hello", user).await.unwrap_err();
        assert!(matches!(err, StoreError::Connectivity(_)));
        assert!(store.comments().await.is_empty());
        assert_eq!(store.fetch(user).await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_preserves_the_blocked_flag() {
        let store = MemoryStore::new();
        let user = UserId(1);
        store
            .seed_user(
                user,
                UserRecord {
                    last_comment_at: None,
                    blocked: true,
                },
            )
            .await;

        store.save_comment("A", "hi", user).await.unwrap();
        assert!(store.fetch(user).await.unwrap().unwrap().blocked);
    }

    #[tokio::test]
    async fn concurrent_saves_keep_one_user_row() {
        let store = Arc::new(MemoryStore::new());
        let user = UserId(42);

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.save_comment("A", "first", user).await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.save_comment("B", "second", user).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // Both comments land; exactly one user row, stamped by the later save.
        let comments = store.comments().await;
        assert_eq!(comments.len(), 2);
        let record = store.fetch(user).await.unwrap().unwrap();
        let latest = comments.iter().map(|c| c.created_at).max().unwrap();
        assert_eq!(record.last_comment_at, Some(latest));
    }
}
