use std::sync::Arc;

use {
    secrecy::{ExposeSecret, Secret},
    tracing::info,
    vocalis_auto_reply::Dispatcher,
    vocalis_channels::{ChannelPlugin, InitContext, InitReport},
    vocalis_media::BlockStore,
    vocalis_telegram::TelegramTransport,
    vocalis_widget::WidgetTransport,
};

#[cfg(feature = "metrics")]
use vocalis_metrics::MetricsHandle;

/// Path Telegram posts updates to; the registered webhook points here.
pub const TELEGRAM_WEBHOOK_PATH: &str = "/telegram_respond";

/// Shared gateway state. Immutable after startup; the only mutable pieces
/// (webhook record, block store) guard themselves.
pub struct GatewayState {
    pub dispatcher: Dispatcher,
    pub telegram: Arc<TelegramTransport>,
    pub widget: WidgetTransport,
    /// Externally reachable base URL, if configured.
    pub public_url: Option<String>,
    /// Bearer token for `/info` and `/init`. `None` rejects every request
    /// to them.
    pub api_token: Option<Secret<String>>,
    pub version: String,
    /// Renders `/metrics`; `None` answers 503.
    #[cfg(feature = "metrics")]
    pub metrics_handle: Option<MetricsHandle>,
}

impl GatewayState {
    pub fn new(dispatcher: Dispatcher, telegram: Arc<TelegramTransport>) -> Self {
        Self {
            dispatcher,
            telegram,
            widget: WidgetTransport::new(),
            public_url: None,
            api_token: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            #[cfg(feature = "metrics")]
            metrics_handle: None,
        }
    }

    #[cfg(feature = "metrics")]
    pub fn with_metrics_handle(mut self, metrics_handle: Option<MetricsHandle>) -> Self {
        self.metrics_handle = metrics_handle;
        self
    }

    pub fn with_public_url(mut self, public_url: Option<String>) -> Self {
        self.public_url = public_url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn with_api_token(mut self, api_token: Option<Secret<String>>) -> Self {
        self.api_token = api_token.filter(|t| !t.expose_secret().is_empty());
        self
    }

    pub fn store(&self) -> &Arc<dyn BlockStore> {
        self.dispatcher.store()
    }

    /// Webhook callback derived from the public URL.
    pub fn callback_url(&self) -> Option<String> {
        self.public_url
            .as_deref()
            .map(|base| format!("{}{TELEGRAM_WEBHOOK_PATH}", base.trim_end_matches('/')))
    }

    /// Run every transport's one-time setup. Safe to repeat.
    pub async fn instance_init(&self) -> vocalis_channels::Result<Vec<InitReport>> {
        let ctx = InitContext {
            callback_url: self.callback_url(),
        };
        let telegram = self.telegram.instance_init(&ctx).await?;
        let widget = self.widget.instance_init(&ctx).await?;
        info!(
            telegram = ?telegram.status,
            widget = ?widget.status,
            "initialization hook finished"
        );
        Ok(vec![telegram, widget])
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*, teloxide::Bot, vocalis_media::InMemoryBlockStore,
        vocalis_tools::CapabilityRegistry,
    };

    fn state() -> GatewayState {
        let store: Arc<dyn BlockStore> = Arc::new(InMemoryBlockStore::new());
        let telegram = Arc::new(TelegramTransport::with_bot(
            Bot::new("123:TEST"),
            Arc::clone(&store),
        ));
        GatewayState::new(Dispatcher::new(CapabilityRegistry::new(), store), telegram)
    }

    #[test]
    fn callback_url_appends_webhook_path() {
        let state = state().with_public_url(Some("https://bot.example.com/".into()));
        assert_eq!(
            state.callback_url().as_deref(),
            Some("https://bot.example.com/telegram_respond")
        );
    }

    #[test]
    fn blank_public_url_means_no_callback() {
        let state = state().with_public_url(Some("  ".into()));
        assert!(state.callback_url().is_none());
    }

    #[test]
    fn empty_api_token_is_dropped() {
        let state = state().with_api_token(Some(Secret::new(String::new())));
        assert!(state.api_token.is_none());
    }

    #[tokio::test]
    async fn init_without_public_url_skips_telegram() {
        let reports = state().instance_init().await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].status, vocalis_channels::InitStatus::Skipped);
        assert_eq!(reports[1].status, vocalis_channels::InitStatus::Ready);
    }
}
