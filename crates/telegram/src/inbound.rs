use {
    teloxide::types::Message,
    vocalis_channels::{Error as ChannelError, Result},
    vocalis_common::ChatMessage,
};

/// Decode a Bot API `Message` object into a user message.
///
/// The chat id becomes the conversation id so replies land in the same chat.
/// Media messages contribute their caption; messages with neither text nor
/// caption decode to empty text, which no capability will claim.
pub fn parse_message(payload: serde_json::Value) -> Result<ChatMessage> {
    let msg: Message = serde_json::from_value(payload)
        .map_err(|e| ChannelError::invalid_input(format!("not a telegram message: {e}")))?;
    Ok(to_chat_message(&msg))
}

pub fn to_chat_message(msg: &Message) -> ChatMessage {
    let text = msg.text().or_else(|| msg.caption()).unwrap_or_default();
    let chat_id = msg.chat.id.0.to_string();
    let mut chat = ChatMessage::user(chat_id.clone(), text)
        .with_tag("chat_id", chat_id)
        .with_tag("message_id", msg.id.0.to_string());

    if let Some(user) = msg.from.as_ref() {
        if let Some(username) = user.username.as_deref() {
            chat = chat.with_tag("username", username);
        }
        chat = chat.with_tag("sender_name", user.full_name());
    }
    chat
}
