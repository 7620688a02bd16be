use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
    vocalis_common::ChatMessage,
};

use crate::Result;

/// Everything a transport may need during instance initialization.
#[derive(Debug, Clone, Default)]
pub struct InitContext {
    /// Externally reachable URL the webhook provider should call back.
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStatus {
    /// The provider now points at a new callback URL.
    Registered,
    /// The provider already pointed at the callback URL; nothing changed.
    Unchanged,
    /// Nothing to register (no callback URL configured).
    Skipped,
    /// Local setup finished.
    Ready,
}

/// Result of one transport's initialization step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitReport {
    pub channel: String,
    pub status: InitStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl InitReport {
    pub fn new(channel: impl Into<String>, status: InitStatus) -> Self {
        Self {
            channel: channel.into(),
            status,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Core transport trait. Each chat surface implements this.
#[async_trait]
pub trait ChannelPlugin: Send + Sync {
    /// Channel identifier (e.g. "telegram", "widget").
    fn id(&self) -> &str;

    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Decode a native inbound payload into a user message.
    fn parse_inbound(&self, payload: serde_json::Value) -> Result<ChatMessage>;

    /// One-time, idempotent setup for this deployed instance.
    async fn instance_init(&self, ctx: &InitContext) -> Result<InitReport>;

    /// Operational metadata for inspection.
    async fn info(&self) -> Result<serde_json::Value>;
}

/// Push replies back to a channel.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    async fn send(&self, messages: &[ChatMessage]) -> Result<()>;
}
