use std::sync::Arc;

use teloxide::prelude::*;

use acb_core::domain::{ChatId, UserId};

use crate::handlers::dispatch;
use crate::router::AppState;

pub async fn handle_text(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if text.trim().is_empty() {
        return Ok(());
    }

    let user_id = UserId(user.id.0 as i64);
    let chat_id = ChatId(msg.chat.id.0);

    let actions = state.pipeline.submit(user_id, text).await;
    dispatch(state.messenger.as_ref(), chat_id, None, actions).await;
    Ok(())
}
