use async_trait::async_trait;

use crate::{
    domain::ChatId,
    messaging::types::{InlineKeyboard, MessageRef},
    Result,
};

/// Cross-messenger port.
///
/// Telegram is the first implementation; the shape is small enough that
/// future adapters can fit behind the same interface.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;
    async fn edit_html(&self, msg: MessageRef, html: &str) -> Result<()>;

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()>;
}
