//! Telegram update handlers.
//!
//! Each handler is a thin adapter: it translates the teloxide update into a
//! pipeline call and dispatches the resulting outbound actions through the
//! messaging port. All sends are best-effort; a delivery failure is logged,
//! never propagated into the dispatcher.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use acb_core::{
    domain::ChatId,
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, MessageRef},
    },
    pipeline::OutboundAction,
};

use crate::router::AppState;

mod callback;
mod commands;
mod text;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    callback::handle_callback(q, state).await
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        // Only text comments are relayed; ignore stickers, photos, etc.
        return Ok(());
    };

    if text.starts_with('/') {
        return commands::handle_command(msg, state).await;
    }

    text::handle_text(msg, state).await
}

/// Deliver pipeline actions. `edit_target` is the message that carried the
/// inline keyboard, when the update has one to edit.
pub(crate) async fn dispatch(
    messenger: &dyn MessagingPort,
    chat_id: ChatId,
    edit_target: Option<MessageRef>,
    actions: Vec<OutboundAction>,
) {
    for action in actions {
        let sent = match action {
            OutboundAction::PromptTargets { text, options } => messenger
                .send_inline_keyboard(chat_id, &text, InlineKeyboard::targets(&options))
                .await
                .map(|_| ()),
            OutboundAction::Edit(text) => match edit_target {
                Some(msg) => messenger.edit_html(msg, &text).await,
                None => messenger.send_html(chat_id, &text).await.map(|_| ()),
            },
            OutboundAction::Reply(text) => messenger.send_html(chat_id, &text).await.map(|_| ()),
            OutboundAction::Notify { chat_id, text } => {
                messenger.send_html(chat_id, &text).await.map(|_| ())
            }
        };
        if let Err(e) = sent {
            tracing::warn!(error = %e, "failed to deliver outbound action");
        }
    }
}
