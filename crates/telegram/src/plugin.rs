use std::sync::Arc;

use {
    async_trait::async_trait,
    secrecy::ExposeSecret,
    teloxide::Bot,
    tracing::info,
    vocalis_channels::{
        ChannelOutbound, ChannelPlugin, InitContext, InitReport, InitStatus, Result,
    },
    vocalis_common::ChatMessage,
    vocalis_media::BlockStore,
};

use crate::{
    Error,
    config::TelegramConfig,
    error::Context,
    inbound,
    outbound::TelegramOutbound,
    webhook::{WebhookOutcome, WebhookRegistrar},
};

/// Webhook-driven Telegram transport.
pub struct TelegramTransport {
    outbound: TelegramOutbound,
    webhook: WebhookRegistrar,
}

impl TelegramTransport {
    pub fn new(config: &TelegramConfig, store: Arc<dyn BlockStore>) -> crate::Result<Self> {
        let token = Some(config.token.expose_secret())
            .filter(|_| config.has_token())
            .context("telegram bot token is not configured")?;
        let mut bot = Bot::new(token);
        if let Some(api_url) = config.api_url.as_deref() {
            let url = url::Url::parse(api_url).map_err(|source| Error::InvalidUrl {
                url: api_url.to_string(),
                source,
            })?;
            bot = bot.set_api_url(url);
        }
        Ok(Self::with_bot(bot, store))
    }

    /// Build around an existing bot, e.g. one pointed at a test server.
    pub fn with_bot(bot: Bot, store: Arc<dyn BlockStore>) -> Self {
        Self {
            outbound: TelegramOutbound::new(bot.clone(), store),
            webhook: WebhookRegistrar::new(bot),
        }
    }

    pub fn webhook(&self) -> &WebhookRegistrar {
        &self.webhook
    }
}

#[async_trait]
impl ChannelPlugin for TelegramTransport {
    fn id(&self) -> &str {
        "telegram"
    }

    fn name(&self) -> &str {
        "Telegram"
    }

    fn parse_inbound(&self, payload: serde_json::Value) -> Result<ChatMessage> {
        inbound::parse_message(payload)
    }

    async fn instance_init(&self, ctx: &InitContext) -> Result<InitReport> {
        let Some(callback_url) = ctx.callback_url.as_deref() else {
            info!("no public url configured, skipping telegram webhook registration");
            return Ok(InitReport::new(self.id(), InitStatus::Skipped)
                .with_detail("no public url configured"));
        };
        let outcome = self.webhook.register(callback_url).await?;
        Ok(InitReport::new(self.id(), outcome.into()).with_detail(callback_url))
    }

    async fn info(&self) -> Result<serde_json::Value> {
        let status = self.webhook.status().await?;
        let mut value = serde_json::to_value(status)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert("channel".into(), self.id().into());
        }
        Ok(value)
    }
}

#[async_trait]
impl ChannelOutbound for TelegramTransport {
    async fn send(&self, messages: &[ChatMessage]) -> Result<()> {
        self.outbound.send(messages).await
    }
}

impl From<WebhookOutcome> for InitStatus {
    fn from(outcome: WebhookOutcome) -> Self {
        match outcome {
            WebhookOutcome::Registered => Self::Registered,
            WebhookOutcome::Unchanged => Self::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*, crate::mock_api::MockTelegramApi, secrecy::Secret, serde_json::json,
        vocalis_media::InMemoryBlockStore,
    };

    #[test]
    fn missing_token_is_rejected() {
        let result = TelegramTransport::new(
            &TelegramConfig::default(),
            Arc::new(InMemoryBlockStore::new()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn custom_api_url_must_parse() {
        let config = TelegramConfig {
            token: Secret::new("123:ABC".into()),
            api_url: Some("::nope".into()),
        };
        let result = TelegramTransport::new(&config, Arc::new(InMemoryBlockStore::new()));
        assert!(matches!(result, Err(Error::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn init_without_public_url_is_skipped() {
        let api = MockTelegramApi::default();
        let (bot, _shutdown) = api.spawn().await;
        let transport = TelegramTransport::with_bot(bot, Arc::new(InMemoryBlockStore::new()));

        let report = transport.instance_init(&InitContext::default()).await.unwrap();
        assert_eq!(report.status, InitStatus::Skipped);
        assert!(api.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn init_twice_registers_once() {
        let api = MockTelegramApi::default();
        let (bot, _shutdown) = api.spawn().await;
        let transport = TelegramTransport::with_bot(bot, Arc::new(InMemoryBlockStore::new()));
        let ctx = InitContext {
            callback_url: Some("https://bot.example.com/telegram_respond".into()),
        };

        let first = transport.instance_init(&ctx).await.unwrap();
        let second = transport.instance_init(&ctx).await.unwrap();
        assert_eq!(first.status, InitStatus::Registered);
        assert_eq!(second.status, InitStatus::Unchanged);
        assert_eq!(api.calls("SetWebhook").len(), 1);
        assert_eq!(
            api.webhook_url.lock().unwrap().as_str(),
            "https://bot.example.com/telegram_respond"
        );
    }

    #[tokio::test]
    async fn info_includes_channel_and_webhook() {
        let api = MockTelegramApi::with_webhook("https://bot.example.com/telegram_respond");
        let (bot, _shutdown) = api.spawn().await;
        let transport = TelegramTransport::with_bot(bot, Arc::new(InMemoryBlockStore::new()));

        let info = transport.info().await.unwrap();
        assert_eq!(info["channel"], "telegram");
        assert_eq!(info["url"], "https://bot.example.com/telegram_respond");
        assert_eq!(info["last_registered"], json!(null));
    }

    #[test]
    fn parse_inbound_delegates_to_decoder() {
        let transport = TelegramTransport::with_bot(
            Bot::new("test-token"),
            Arc::new(InMemoryBlockStore::new()),
        );
        let msg = transport
            .parse_inbound(json!({
                "message_id": 1,
                "date": 1,
                "chat": { "id": 42, "type": "private", "first_name": "Alice" },
                "text": "say hi"
            }))
            .unwrap();
        assert_eq!(msg.conversation_id, "42");
        assert_eq!(msg.text, "say hi");
    }
}
