/// Escape user-controlled text for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// The anonymous notification posted to the moderation channel.
pub fn group_notification(target_name: &str, comment: &str) -> String {
    format!(
        "📌 <b>New Anonymous Comment</b>\n\n🎯 <b>Target:</b> {}\n\n💬 <b>Comment:</b>\n{}",
        escape_html(target_name),
        escape_html(comment)
    )
}
