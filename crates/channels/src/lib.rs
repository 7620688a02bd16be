//! Transport plugin system.
//!
//! Each chat surface (Telegram webhook, embedded widget) implements
//! [`ChannelPlugin`] to turn its native payload into a `ChatMessage` and to
//! run its one-time setup. Push-style surfaces also implement
//! [`ChannelOutbound`].

pub mod error;
pub mod plugin;

pub use {
    error::{Error, Result},
    plugin::{ChannelOutbound, ChannelPlugin, InitContext, InitReport, InitStatus},
};
