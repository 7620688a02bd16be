use std::sync::RwLock;

use {
    serde::Serialize,
    teloxide::prelude::*,
    tracing::{debug, info},
    url::Url,
};

#[cfg(feature = "metrics")]
use vocalis_metrics::{counter, labels, telegram as tg_metrics};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    Registered,
    Unchanged,
}

impl WebhookOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Unchanged => "unchanged",
        }
    }
}

/// Snapshot of the provider-side webhook state.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookStatus {
    pub url: Option<String>,
    pub pending_update_count: u32,
    pub last_error_message: Option<String>,
    pub has_custom_certificate: bool,
    /// URL this process last registered or confirmed.
    pub last_registered: Option<String>,
}

/// Keeps the bot's webhook pointed at one callback URL.
pub struct WebhookRegistrar {
    bot: Bot,
    last_registered: RwLock<Option<String>>,
}

impl WebhookRegistrar {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            last_registered: RwLock::new(None),
        }
    }

    pub fn last_registered(&self) -> Option<String> {
        self.last_registered
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Point the webhook at `callback_url` unless it already is.
    ///
    /// Asks the provider first, so a restarted process does not re-register
    /// an unchanged URL.
    pub async fn register(&self, callback_url: &str) -> Result<WebhookOutcome> {
        let url = Url::parse(callback_url).map_err(|source| Error::InvalidUrl {
            url: callback_url.to_string(),
            source,
        })?;

        let current = self.bot.get_webhook_info().await?;
        let outcome = if current.url.as_ref().map(Url::as_str) == Some(url.as_str()) {
            debug!(url = %url, "telegram webhook already registered");
            WebhookOutcome::Unchanged
        } else {
            self.bot.set_webhook(url.clone()).await?;
            info!(
                url = %url,
                previous = ?current.url.as_ref().map(Url::as_str),
                "telegram webhook registered"
            );
            WebhookOutcome::Registered
        };
        #[cfg(feature = "metrics")]
        counter!(
            tg_metrics::WEBHOOK_REGISTRATIONS_TOTAL,
            labels::OUTCOME => outcome.as_str()
        )
        .increment(1);

        *self
            .last_registered
            .write()
            .unwrap_or_else(|e| e.into_inner()) = Some(url.to_string());
        Ok(outcome)
    }

    pub async fn status(&self) -> Result<WebhookStatus> {
        let info = self.bot.get_webhook_info().await?;
        Ok(WebhookStatus {
            url: info.url.map(|u| u.to_string()),
            pending_update_count: info.pending_update_count,
            last_error_message: info.last_error_message,
            has_custom_certificate: info.has_custom_certificate,
            last_registered: self.last_registered(),
        })
    }
}
