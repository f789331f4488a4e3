use std::sync::Arc;

use teloxide::prelude::*;

use acb_core::domain::{ChatId, UserId};

use crate::handlers::dispatch;
use crate::router::AppState;

fn parse_command(text: &str) -> String {
    // Telegram may send `/cmd@botname args`.
    text.trim()
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase()
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = UserId(user.id.0 as i64);
    let chat_id = ChatId(msg.chat.id.0);

    let action = match parse_command(msg.text().unwrap_or_default()).as_str() {
        "start" => state.pipeline.start(user_id).await,
        "cancel" => state.pipeline.cancel(user_id).await,
        _ => {
            let _ = state
                .messenger
                .send_html(chat_id, "Unknown command. Use /start to begin.")
                .await;
            return Ok(());
        }
    };

    dispatch(state.messenger.as_ref(), chat_id, None, vec![action]).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_tolerate_bot_suffix_and_arguments() {
        assert_eq!(parse_command("/start"), "start");
        assert_eq!(parse_command("/start@my_bot"), "start");
        assert_eq!(parse_command("/CANCEL extra words"), "cancel");
        assert_eq!(parse_command("/"), "");
    }
}
