//! The comment submission pipeline: orchestrates the session map, the
//! validation gate, and the store port to process one inbound event
//! end-to-end.
//!
//! The pipeline never talks to Telegram directly. Each operation returns
//! [`OutboundAction`]s and the transport adapter dispatches them, so the
//! whole flow is testable against the in-memory store.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    config::Config,
    domain::{ChatId, UserId},
    filters,
    formatting::{escape_html, group_notification},
    session::SessionMap,
    store::UserRecordStore,
    targets::TargetRegistry,
};

/// What the transport should do in response to an inbound event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundAction {
    /// Prompt the user with one button per target, in registry order.
    PromptTargets {
        text: String,
        options: Vec<(String, String)>,
    },
    /// Edit the message that carried the target keyboard.
    Edit(String),
    /// Plain reply to the submitting user.
    Reply(String),
    /// Anonymous notification to the moderation channel.
    Notify { chat_id: ChatId, text: String },
}

pub struct SubmissionPipeline {
    targets: TargetRegistry,
    sessions: SessionMap,
    store: Arc<dyn UserRecordStore>,
    group_chat: ChatId,
    rate_limit_secs: i64,
    profanity_words: Vec<String>,
}

impl SubmissionPipeline {
    pub fn new(cfg: &Config, store: Arc<dyn UserRecordStore>) -> Self {
        Self {
            targets: cfg.targets.clone(),
            sessions: SessionMap::new(),
            store,
            group_chat: ChatId(cfg.group_chat_id),
            rate_limit_secs: cfg.rate_limit_secs,
            profanity_words: cfg.profanity_words.clone(),
        }
    }

    /// `/start`: greet and offer the target choices. Any selection already
    /// in flight for this user is abandoned.
    pub async fn start(&self, user: UserId) -> OutboundAction {
        self.sessions.clear(user).await;
        OutboundAction::PromptTargets {
            text: "Hello! Please select who you'd like to comment on:".to_string(),
            options: self
                .targets
                .iter()
                .map(|(k, n)| (k.to_string(), n.to_string()))
                .collect(),
        }
    }

    /// Target button pressed: guard on the blocked flag, then enter the
    /// awaiting-comment state.
    pub async fn select_target(&self, user: UserId, key: &str) -> OutboundAction {
        let Some(name) = self.targets.display_name(key) else {
            return OutboundAction::Edit(
                "That choice is no longer available. Use /start to begin again.".to_string(),
            );
        };

        match self.store.fetch(user).await {
            Ok(Some(record)) if record.blocked => {
                return OutboundAction::Edit(
                    "You are currently blocked from submitting comments.".to_string(),
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(user_id = user.0, error = %e, "user lookup failed during target selection");
                return OutboundAction::Edit(
                    "Something went wrong on our side. Please try again later.".to_string(),
                );
            }
        }

        self.sessions.begin(user, key).await;
        OutboundAction::Edit(format!(
            "You have selected {}.\n\nPlease write your anonymous comment and send it.",
            escape_html(name)
        ))
    }

    /// Comment text received: validate, persist, and fan out the group
    /// notification plus the user acknowledgment.
    ///
    /// Validation rejections keep the session (the user may resend);
    /// success and persistence failures both clear it.
    pub async fn submit(&self, user: UserId, text: &str) -> Vec<OutboundAction> {
        let Some(target_key) = self.sessions.pending(user).await else {
            return vec![OutboundAction::Reply(
                "Your session has expired. Please use /start to begin again.".to_string(),
            )];
        };

        if filters::contains_profanity(text, &self.profanity_words) {
            return vec![OutboundAction::Reply(
                "Your message appears to contain inappropriate language. Please revise it and send again."
                    .to_string(),
            )];
        }

        let record = match self.store.fetch(user).await {
            Ok(record) => record.unwrap_or_default(),
            Err(e) => {
                tracing::error!(user_id = user.0, error = %e, "user lookup failed during submission");
                self.sessions.clear(user).await;
                return vec![delivery_failure()];
            }
        };

        let decision =
            filters::allowed_by_rate_limit(record.last_comment_at, self.rate_limit_secs, Utc::now());
        if !decision.allowed {
            return vec![OutboundAction::Reply(format!(
                "You are sending comments too quickly. Please wait {} more seconds.",
                decision.retry_after_secs
            ))];
        }

        if let Err(e) = self.store.save_comment(&target_key, text, user).await {
            tracing::error!(user_id = user.0, error = %e, "failed to save comment");
            self.sessions.clear(user).await;
            return vec![delivery_failure()];
        }

        // The registry can only lose a key if it changed under a live
        // session; fall back to the raw key rather than dropping the
        // notification.
        let display = self
            .targets
            .display_name(&target_key)
            .unwrap_or(target_key.as_str());

        let actions = vec![
            OutboundAction::Notify {
                chat_id: self.group_chat,
                text: group_notification(display, text),
            },
            OutboundAction::Reply(
                "Thank you! Your anonymous comment has been delivered.".to_string(),
            ),
        ];
        self.sessions.clear(user).await;
        actions
    }

    /// `/cancel`: return the user to idle.
    pub async fn cancel(&self, user: UserId) -> OutboundAction {
        self.sessions.clear(user).await;
        OutboundAction::Reply("Action cancelled. Use /start to begin again.".to_string())
    }
}

fn delivery_failure() -> OutboundAction {
    OutboundAction::Reply(
        "Sorry, there was an error delivering your comment. Please try again later.".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRecord;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn test_config() -> Config {
        Config {
            bot_token: "test-token".to_string(),
            group_chat_id: -100,
            database_url: "postgres://unused".to_string(),
            rate_limit_secs: 120,
            profanity_words: vec!["badword1".to_string(), "badword2".to_string()],
            targets: TargetRegistry::default(),
        }
    }

    fn pipeline_with(store: Arc<MemoryStore>) -> SubmissionPipeline {
        SubmissionPipeline::new(&test_config(), store)
    }

    fn reply_text(action: &OutboundAction) -> &str {
        match action {
            OutboundAction::Reply(text) => text,
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn start_offers_all_targets_in_order() {
        let pipeline = pipeline_with(Arc::new(MemoryStore::new()));

        match pipeline.start(UserId(1)).await {
            OutboundAction::PromptTargets { options, .. } => {
                let keys: Vec<&str> = options.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["A", "B", "C"]);
            }
            other => panic!("expected PromptTargets, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn happy_path_delivers_to_group_and_acknowledges() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(store.clone());
        let user = UserId(1);

        pipeline.select_target(user, "A").await;
        let actions = pipeline.submit(user, "hello").await;

        assert_eq!(actions.len(), 2);
        match &actions[0] {
            OutboundAction::Notify { chat_id, text } => {
                assert_eq!(*chat_id, ChatId(-100));
                assert!(text.contains("Person A"));
                assert!(text.contains("hello"));
            }
            other => panic!("expected Notify, got {other:?}"),
        }
        assert!(reply_text(&actions[1]).contains("delivered"));

        let comments = store.comments().await;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].target, "A");
        assert_eq!(comments[0].text, "hello");

        // Session is back to idle: a second text is an expired session.
        let actions = pipeline.submit(user, "again").await;
        assert!(reply_text(&actions[0]).contains("expired"));
    }

    #[tokio::test]
    async fn profanity_keeps_the_session_and_saves_nothing() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(store.clone());
        let user = UserId(1);

        pipeline.select_target(user, "B").await;
        let actions = pipeline.submit(user, "so much badword1 here").await;

        assert_eq!(actions.len(), 1);
        assert!(reply_text(&actions[0]).contains("revise"));
        assert!(store.comments().await.is_empty());

        // Still awaiting: a clean resend goes through without re-selecting.
        let actions = pipeline.submit(user, "clean now").await;
        assert!(matches!(actions[0], OutboundAction::Notify { .. }));
    }

    #[tokio::test]
    async fn rate_limited_user_is_told_the_remaining_wait() {
        let store = Arc::new(MemoryStore::new());
        let user = UserId(1);
        store
            .seed_user(
                user,
                UserRecord {
                    last_comment_at: Some(Utc::now() - Duration::seconds(10)),
                    blocked: false,
                },
            )
            .await;
        let pipeline = pipeline_with(store.clone());

        pipeline.select_target(user, "A").await;
        let actions = pipeline.submit(user, "too soon").await;

        let text = reply_text(&actions[0]);
        assert!(text.contains("too quickly"));
        // ~110s left of the 120s window; allow for test scheduling slack.
        assert!(text.contains("109") || text.contains("110"));
        assert!(store.comments().await.is_empty());

        // Session kept: the user stays in the awaiting-comment state.
        let actions = pipeline.submit(user, "still too soon").await;
        assert!(reply_text(&actions[0]).contains("too quickly"));
    }

    #[tokio::test]
    async fn blocked_user_is_refused_at_target_selection() {
        let store = Arc::new(MemoryStore::new());
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
        let pipeline = pipeline_with(store.clone());

        match pipeline.select_target(user, "A").await {
            OutboundAction::Edit(text) => assert!(text.contains("blocked")),
            other => panic!("expected Edit, got {other:?}"),
        }

        // No session was created, so text lands on an expired session.
        let actions = pipeline.submit(user, "hello").await;
        assert!(reply_text(&actions[0]).contains("expired"));
        assert!(store.comments().await.is_empty());
    }

    #[tokio::test]
    async fn text_without_a_selection_is_an_expired_session() {
        let store = Arc::new(MemoryStore::new());
        // Any store call would fail loudly; the expired-session path must
        // not touch the store at all.
        store.fail_saves(true).await;
        let pipeline = pipeline_with(store.clone());

        let actions = pipeline.submit(UserId(1), "hello").await;
        assert_eq!(actions.len(), 1);
        assert!(reply_text(&actions[0]).contains("expired"));
    }

    #[tokio::test]
    async fn fetch_failure_at_selection_creates_no_session() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(store.clone());
        let user = UserId(1);

        store.fail_fetches(true).await;
        match pipeline.select_target(user, "A").await {
            OutboundAction::Edit(text) => assert!(text.contains("try again later")),
            other => panic!("expected Edit, got {other:?}"),
        }

        // The blocked-check never passed, so no session exists.
        store.fail_fetches(false).await;
        let actions = pipeline.submit(user, "hello").await;
        assert!(reply_text(&actions[0]).contains("expired"));
        assert!(store.comments().await.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_during_submission_clears_the_session() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(store.clone());
        let user = UserId(1);

        pipeline.select_target(user, "A").await;
        store.fail_fetches(true).await;

        let actions = pipeline.submit(user, "hello").await;
        assert_eq!(actions.len(), 1);
        assert!(reply_text(&actions[0]).contains("error delivering"));
        assert!(store.comments().await.is_empty());

        // Session cleared: the user must restart from target selection.
        store.fail_fetches(false).await;
        let actions = pipeline.submit(user, "hello").await;
        assert!(reply_text(&actions[0]).contains("expired"));
    }

    #[tokio::test]
    async fn persistence_failure_apologizes_and_clears_the_session() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(store.clone());
        let user = UserId(1);

        pipeline.select_target(user, "A").await;
        store.fail_saves(true).await;

        let actions = pipeline.submit(user, "hello").await;
        assert_eq!(actions.len(), 1);
        assert!(reply_text(&actions[0]).contains("error delivering"));

        // Session cleared: the user must restart rather than retry into a
        // broken store.
        store.fail_saves(false).await;
        let actions = pipeline.submit(user, "hello").await;
        assert!(reply_text(&actions[0]).contains("expired"));
    }

    #[tokio::test]
    async fn unknown_target_key_is_rejected_without_a_session() {
        let pipeline = pipeline_with(Arc::new(MemoryStore::new()));

        match pipeline.select_target(UserId(1), "nope").await {
            OutboundAction::Edit(text) => assert!(text.contains("/start")),
            other => panic!("expected Edit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancel_returns_the_user_to_idle() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(store.clone());
        let user = UserId(1);

        pipeline.select_target(user, "A").await;
        let action = pipeline.cancel(user).await;
        assert!(reply_text(&action).contains("cancelled"));

        let actions = pipeline.submit(user, "hello").await;
        assert!(reply_text(&actions[0]).contains("expired"));
    }

    #[tokio::test]
    async fn one_users_failure_does_not_touch_anothers_session() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(store.clone());
        let (alice, bob) = (UserId(1), UserId(2));

        pipeline.select_target(alice, "A").await;
        pipeline.select_target(bob, "B").await;

        store.fail_saves(true).await;
        pipeline.submit(alice, "hello").await;
        store.fail_saves(false).await;

        // Bob's session survived Alice's failure.
        let actions = pipeline.submit(bob, "hi there").await;
        assert!(matches!(actions[0], OutboundAction::Notify { .. }));
    }
}
