use {anyhow::Result, async_trait::async_trait, vocalis_common::BlockId};

/// What a capability produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityOutput {
    /// Text to send back as-is.
    Inline(String),
    /// Content held by the block store.
    Reference(BlockId),
}

impl CapabilityOutput {
    /// Classify a raw string result from a backend that only speaks strings.
    ///
    /// A canonical lowercase v4 UUID is a block reference; anything else is
    /// inline text.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        match BlockId::parse_reference(&raw) {
            Some(id) => Self::Reference(id),
            None => Self::Inline(raw),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Inline(_) => "inline",
            Self::Reference(_) => "reference",
        }
    }
}

/// A pluggable responder that may claim an inbound message.
#[async_trait]
pub trait Capability: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Confidence in `[0.0, 1.0]` that this capability should answer `text`.
    ///
    /// Must be cheap and free of side effects; the backing service is never
    /// called here.
    fn preemption_score(&self, text: &str) -> f32;

    /// Turn conversational input into the payload passed to [`invoke`].
    ///
    /// [`invoke`]: Capability::invoke
    fn build_prompt(&self, text: &str) -> String;

    async fn invoke(&self, prompt: &str) -> Result<CapabilityOutput>;
}
