use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::UserId;

/// Per-user conversation slot: the target a user selected while the bot
/// waits for their comment text.
///
/// An absent entry is the idle state; a present entry means the user owes
/// us a comment. Held only in process memory: a restart drops every pending
/// selection, and users are told their session expired when they next send
/// text without re-selecting.
///
/// Concurrent events for the same user race on the slot (last write wins);
/// the store transaction is the only place that needs real atomicity.
#[derive(Default)]
pub struct SessionMap {
    inner: Mutex<HashMap<UserId, String>>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the awaiting-comment state for this user.
    pub async fn begin(&self, user: UserId, target_key: &str) {
        self.inner
            .lock()
            .await
            .insert(user, target_key.to_string());
    }

    /// The target key this user selected, if they are mid-flow.
    pub async fn pending(&self, user: UserId) -> Option<String> {
        self.inner.lock().await.get(&user).cloned()
    }

    /// Return the user to idle (submit resolved, failure, or cancel).
    pub async fn clear(&self, user: UserId) {
        self.inner.lock().await.remove(&user);
    }
}
