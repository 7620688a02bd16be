//! Telegram webhook transport for vocalis.
//!
//! Decodes Bot API updates into `ChatMessage`s, pushes replies back with
//! teloxide, and keeps the provider's webhook pointed at this instance.

pub mod config;
pub mod error;
pub mod inbound;
pub mod outbound;
pub mod plugin;
pub mod webhook;

#[cfg(any(test, feature = "test-support"))]
pub mod mock_api;

pub use {
    config::TelegramConfig,
    error::{Error, Result},
    plugin::TelegramTransport,
    webhook::WebhookOutcome,
};
