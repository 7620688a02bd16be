//! Capabilities that can preempt an inbound chat message.
//!
//! A capability scores incoming text cheaply, turns it into a prompt, and
//! produces either inline text or a reference to a stored block. The
//! registry keeps capabilities in priority order; the dispatcher in
//! `vocalis-auto-reply` walks it.

pub mod capability;
pub mod registry;
pub mod speech;

pub use {
    capability::{Capability, CapabilityOutput},
    registry::CapabilityRegistry,
    speech::GenerateSpeechTool,
};
