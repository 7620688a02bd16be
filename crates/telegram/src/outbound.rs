use std::sync::Arc;

use {
    async_trait::async_trait,
    teloxide::{
        prelude::*,
        types::{ChatId, InputFile},
    },
    tracing::{debug, info, warn},
    vocalis_channels::{ChannelOutbound, Error as ChannelError, Result},
    vocalis_common::ChatMessage,
    vocalis_media::BlockStore,
};

#[cfg(feature = "metrics")]
use vocalis_metrics::{counter, labels, telegram as tg_metrics};

/// Count a push by kind, or the failure that stopped it.
#[cfg(feature = "metrics")]
fn record_send<T>(kind: &'static str, result: &std::result::Result<T, teloxide::RequestError>) {
    let name = if result.is_ok() {
        tg_metrics::MESSAGES_SENT_TOTAL
    } else {
        tg_metrics::SEND_ERRORS_TOTAL
    };
    counter!(name, labels::KIND => kind).increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_send<T>(
    _kind: &'static str,
    _result: &std::result::Result<T, teloxide::RequestError>,
) {
}

/// Telegram limits text messages to 4096 characters.
pub const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;

/// Split text into chunks of at most `max_len` bytes, preferring newline
/// then space boundaries and never cutting through a UTF-8 character.
pub fn chunk_message(text: &str, max_len: usize) -> Vec<String> {
    if max_len == 0 {
        return Vec::new();
    }
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        let mut window = remaining.floor_char_boundary(max_len);
        if window == 0 {
            window = remaining
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(remaining.len());
        }

        let slice = &remaining[..window];
        let split_at = match slice.rfind('\n').or_else(|| slice.rfind(' ')) {
            Some(0) | None => window,
            Some(at) => at,
        };

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start_matches('\n');
        if let Some(rest) = remaining.strip_prefix(' ') {
            remaining = rest;
        }
    }
    chunks
}

fn audio_file_name(mime_type: &str) -> &'static str {
    match mime_type {
        "audio/ogg" => "audio.ogg",
        "audio/aac" => "audio.aac",
        _ => "audio.mp3",
    }
}

fn image_file_name(mime_type: &str) -> &'static str {
    match mime_type {
        "image/png" => "image.png",
        "image/gif" => "image.gif",
        "image/webp" => "image.webp",
        _ => "image.jpg",
    }
}

fn chat_id_of(msg: &ChatMessage) -> Result<ChatId> {
    msg.conversation_id
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| {
            ChannelError::invalid_input(format!(
                "telegram conversation id must be a chat id, got {:?}",
                msg.conversation_id
            ))
        })
}

/// Pushes replies through the Bot API.
#[derive(Clone)]
pub struct TelegramOutbound {
    pub(crate) bot: Bot,
    pub(crate) store: Arc<dyn BlockStore>,
}

impl TelegramOutbound {
    pub fn new(bot: Bot, store: Arc<dyn BlockStore>) -> Self {
        Self { bot, store }
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let chunks = chunk_message(text, TELEGRAM_MAX_MESSAGE_LEN);
        debug!(chat_id = chat_id.0, chunk_count = chunks.len(), "telegram outbound text");
        for chunk in chunks.iter().filter(|c| !c.is_empty()) {
            let sent = self.bot.send_message(chat_id, chunk).await;
            record_send("text", &sent);
            sent.map_err(|e| ChannelError::external("telegram sendMessage", e))?;
        }
        Ok(())
    }

    /// Upload the referenced block as audio or photo. Returns `false` when
    /// the message should fall back to plain text.
    async fn send_media(&self, chat_id: ChatId, msg: &ChatMessage) -> Result<bool> {
        let (Some(id), Some(mime_type)) = (msg.source_reference, msg.mime_type.as_deref()) else {
            return Ok(false);
        };
        let block = self
            .store
            .get(&id)
            .await
            .map_err(|e| ChannelError::external("load block for telegram upload", e))?;
        let Some(content) = block.content else {
            warn!(block_id = %id, "media block has no content, sending text");
            return Ok(false);
        };

        if mime_type.starts_with("audio/") {
            let input = InputFile::memory(content.to_vec()).file_name(audio_file_name(mime_type));
            let sent = self.bot.send_audio(chat_id, input).await;
            record_send("audio", &sent);
            sent.map_err(|e| ChannelError::external("telegram sendAudio", e))?;
        } else if mime_type.starts_with("image/") {
            let input = InputFile::memory(content.to_vec()).file_name(image_file_name(mime_type));
            let sent = self.bot.send_photo(chat_id, input).await;
            record_send("photo", &sent);
            sent.map_err(|e| ChannelError::external("telegram sendPhoto", e))?;
        } else {
            return Ok(false);
        }

        info!(
            chat_id = chat_id.0,
            block_id = %id,
            mime_type,
            bytes = content.len(),
            "telegram outbound media sent"
        );
        Ok(true)
    }
}

#[async_trait]
impl ChannelOutbound for TelegramOutbound {
    async fn send(&self, messages: &[ChatMessage]) -> Result<()> {
        for msg in messages {
            let chat_id = chat_id_of(msg)?;
            if !self.send_media(chat_id, msg).await? {
                self.send_text(chat_id, &msg.text).await?;
            }
        }
        Ok(())
    }
}
