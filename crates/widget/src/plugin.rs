use {
    async_trait::async_trait,
    serde_json::{Value, json},
    tracing::debug,
    vocalis_channels::{ChannelPlugin, InitContext, InitReport, InitStatus, Result},
    vocalis_common::ChatMessage,
};

use crate::payload::{AnswerRequest, reply_payload};

/// Request/response transport for the embedded web widget.
#[derive(Debug, Default, Clone)]
pub struct WidgetTransport;

impl WidgetTransport {
    pub fn new() -> Self {
        Self
    }

    /// Native request payload for `msg`; decoding it yields the same
    /// conversation id and text.
    pub fn encode_request(&self, msg: &ChatMessage) -> Result<Value> {
        Ok(serde_json::to_value(AnswerRequest::from_message(msg))?)
    }

    /// Native response payload for a dispatch result.
    pub fn encode_reply(&self, reply: Option<&ChatMessage>) -> Result<Value> {
        reply_payload(reply)
    }
}

#[async_trait]
impl ChannelPlugin for WidgetTransport {
    fn id(&self) -> &str {
        "widget"
    }

    fn name(&self) -> &str {
        "Web widget"
    }

    fn parse_inbound(&self, payload: Value) -> Result<ChatMessage> {
        let msg = AnswerRequest::decode(payload)?.into_message();
        debug!(conversation_id = %msg.conversation_id, "widget question received");
        Ok(msg)
    }

    async fn instance_init(&self, _ctx: &InitContext) -> Result<InitReport> {
        Ok(InitReport::new(self.id(), InitStatus::Ready))
    }

    async fn info(&self) -> Result<Value> {
        Ok(json!({ "channel": self.id(), "mode": "request_response" }))
    }
}
