use std::sync::Arc;

use teloxide::prelude::*;

use acb_core::{
    domain::{ChatId, UserId},
    messaging::types::{MessageId, MessageRef},
};

use crate::handlers::dispatch;
use crate::router::AppState;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let cb_id = q.id.clone();
    let data = q.data.clone().unwrap_or_default();

    // Every callback query gets answered through the port, which carries
    // the 429 retry; failures are best-effort like any other send.
    let answer = |text: Option<&'static str>| {
        let messenger = state.messenger.clone();
        let cb_id = cb_id.clone();
        async move {
            if let Err(e) = messenger.answer_callback_query(&cb_id, text).await {
                tracing::warn!(error = %e, "failed to answer callback query");
            }
        }
    };

    // The keyboard message is where the selection gets confirmed; without
    // it (or without data) there is nothing to do beyond answering.
    let Some(message) = q.message.as_ref() else {
        answer(None).await;
        return Ok(());
    };
    let Some(key) = data.strip_prefix("target:") else {
        answer(None).await;
        return Ok(());
    };

    let user_id = UserId(q.from.id.0 as i64);
    let chat_id = ChatId(message.chat.id.0);
    let edit_target = MessageRef {
        chat_id,
        message_id: MessageId(message.id.0),
    };

    let action = state.pipeline.select_target(user_id, key).await;
    dispatch(
        state.messenger.as_ref(),
        chat_id,
        Some(edit_target),
        vec![action],
    )
    .await;

    answer(None).await;
    Ok(())
}
