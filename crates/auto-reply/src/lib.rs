//! Inbound message processing: the glue between transports and capabilities.
//!
//! Flow: transport decodes a `ChatMessage` → the dispatcher scores it against
//! each registered capability in order → the first confident capability is
//! invoked → its output is normalized into a reply `ChatMessage` → the
//! transport encodes or pushes the reply.

pub mod error;
pub mod reply;

pub use {
    error::{Error, Result},
    reply::{CONFIDENCE_THRESHOLD, Dispatcher, PreemptionDecision},
};
