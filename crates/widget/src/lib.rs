//! Embedded web widget transport.
//!
//! Request/response only: the widget posts a question and receives the
//! reply inline, so there is no outbound push.

pub mod payload;
pub mod plugin;

pub use {
    payload::{AnswerRequest, ROLE_MARKER},
    plugin::WidgetTransport,
};
