//! Text-to-speech capability.
//!
//! Claims messages that explicitly ask for something to be spoken, turns the
//! request into the text to read, synthesizes it and parks the audio in the
//! block store.

use std::sync::Arc;

use {
    anyhow::{Context, Result, bail},
    async_trait::async_trait,
    tracing::{debug, info},
    vocalis_media::{Block, BlockStore},
    vocalis_voice::{AudioFormat, SynthesizeRequest, TtsProvider},
};

use crate::capability::{Capability, CapabilityOutput};

/// Leading phrases that unambiguously ask for speech.
const LEADING_TRIGGERS: &[&str] = &[
    "read aloud",
    "read out",
    "read this",
    "pronounce",
    "speak",
    "say",
];

/// Phrases that ask for speech anywhere in the message.
const ANYWHERE_TRIGGERS: &[&str] = &["out loud", "aloud"];

/// Words that hint at audio without asking for it.
const WEAK_HINTS: &[&str] = &["voice", "audio", "speech"];

const LEADING_SCORE: f32 = 0.95;
const ANYWHERE_SCORE: f32 = 0.85;
const HINT_SCORE: f32 = 0.3;

/// Speaks text back to the user.
pub struct GenerateSpeechTool {
    provider: Arc<dyn TtsProvider>,
    store: Arc<dyn BlockStore>,
    format: AudioFormat,
}

impl GenerateSpeechTool {
    pub fn new(
        provider: Arc<dyn TtsProvider>,
        store: Arc<dyn BlockStore>,
        format: AudioFormat,
    ) -> Self {
        Self {
            provider,
            store,
            format,
        }
    }
}

/// Returns the trigger `text` starts with, matched on a word boundary.
fn leading_trigger(lower: &str) -> Option<&'static str> {
    LEADING_TRIGGERS.iter().copied().find(|trigger| {
        lower.starts_with(trigger)
            && lower[trigger.len()..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric())
    })
}

fn contains_word(lower: &str, word: &str) -> bool {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

fn trim_quotes(s: &str) -> &str {
    let s = s.trim();
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”')] {
        if let Some(inner) = s.strip_prefix(open).and_then(|rest| rest.strip_suffix(close)) {
            return inner.trim();
        }
    }
    s
}

#[async_trait]
impl Capability for GenerateSpeechTool {
    fn name(&self) -> &str {
        "generate_speech"
    }

    fn description(&self) -> &str {
        "Reads text out loud and replies with an audio clip"
    }

    fn preemption_score(&self, text: &str) -> f32 {
        let lower = text.trim().to_lowercase();
        if lower.is_empty() {
            return 0.0;
        }
        if leading_trigger(&lower).is_some() {
            return LEADING_SCORE;
        }
        if ANYWHERE_TRIGGERS.iter().any(|t| lower.contains(t)) {
            return ANYWHERE_SCORE;
        }
        if WEAK_HINTS.iter().any(|w| contains_word(&lower, w)) {
            return HINT_SCORE;
        }
        0.0
    }

    fn build_prompt(&self, text: &str) -> String {
        let trimmed = text.trim();
        let lower = trimmed.to_lowercase();
        // Triggers are ASCII, so their byte length carries over to `trimmed`.
        let rest = match leading_trigger(&lower) {
            Some(trigger) if trimmed.is_char_boundary(trigger.len()) => &trimmed[trigger.len()..],
            _ => trimmed,
        };
        let rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ':' || c == ',');
        trim_quotes(rest).to_string()
    }

    async fn invoke(&self, prompt: &str) -> Result<CapabilityOutput> {
        if prompt.trim().is_empty() {
            bail!("nothing to speak");
        }
        if !self.provider.is_configured() {
            bail!("{} speech provider is not configured", self.provider.name());
        }
        debug!(
            provider = self.provider.id(),
            chars = prompt.len(),
            "synthesizing speech"
        );
        let audio = self
            .provider
            .synthesize(SynthesizeRequest {
                text: prompt.to_string(),
                output_format: self.format,
            })
            .await
            .with_context(|| format!("{} speech synthesis failed", self.provider.name()))?;

        let block = Block::binary(prompt, audio.format.mime_type(), audio.data)
            .with_tag("kind", "speech")
            .with_tag("voice", self.provider.default_voice());
        let id = self
            .store
            .put(block)
            .await
            .context("failed to store synthesized audio")?;
        info!(block_id = %id, format = audio.format.extension(), "speech stored");
        Ok(CapabilityOutput::Reference(id))
    }
}
