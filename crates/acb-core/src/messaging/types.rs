use crate::domain::ChatId;

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a sent message, used for later edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Inline keyboard (buttons) used for target selection.
#[derive(Clone, Debug)]
pub struct InlineKeyboard {
    pub buttons: Vec<InlineButton>,
}

#[derive(Clone, Debug)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineKeyboard {
    /// One button per row, one row per target, with `target:{key}`
    /// callback data.
    pub fn targets(options: &[(String, String)]) -> Self {
        let buttons = options
            .iter()
            .map(|(key, label)| InlineButton {
                label: label.clone(),
                callback_data: format!("target:{key}"),
            })
            .collect();
        Self { buttons }
    }
}
