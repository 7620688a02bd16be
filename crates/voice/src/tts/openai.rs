//! OpenAI TTS provider implementation.
//!
//! OpenAI offers text-to-speech with multiple voices and two quality tiers:
//! - tts-1: Optimized for real-time, lower latency
//! - tts-1-hd: Higher quality, slightly higher latency

use {
    anyhow::{Context, Result, anyhow},
    async_trait::async_trait,
    reqwest::Client,
    secrecy::{ExposeSecret, Secret},
    serde::Serialize,
    tracing::debug,
};

use super::{AudioFormat, AudioOutput, ModelTier, SynthesizeRequest, TtsProvider, Voice};

/// OpenAI API base URL.
const API_BASE: &str = "https://api.openai.com/v1";

/// Default voice.
const DEFAULT_VOICE: &str = "alloy";

/// Available OpenAI TTS voices.
const VOICES: &[(&str, &str)] = &[
    ("alloy", "Alloy - Neutral, balanced"),
    ("echo", "Echo - Warm, conversational"),
    ("fable", "Fable - Expressive, storytelling"),
    ("onyx", "Onyx - Deep, authoritative"),
    ("nova", "Nova - Friendly, upbeat"),
    ("shimmer", "Shimmer - Soft, gentle"),
];

/// OpenAI TTS provider.
#[derive(Clone)]
pub struct OpenAiTts {
    client: Client,
    api_key: Option<Secret<String>>,
    base_url: String,
    default_voice: String,
    tier: ModelTier,
}

impl std::fmt::Debug for OpenAiTts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiTts")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("default_voice", &self.default_voice)
            .field("tier", &self.tier)
            .finish()
    }
}

impl Default for OpenAiTts {
    fn default() -> Self {
        Self::new(None, ModelTier::Standard)
    }
}

impl OpenAiTts {
    /// Create a new OpenAI TTS provider.
    #[must_use]
    pub fn new(api_key: Option<Secret<String>>, tier: ModelTier) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: API_BASE.into(),
            default_voice: DEFAULT_VOICE.into(),
            tier,
        }
    }

    /// Override the default voice.
    #[must_use]
    pub fn with_voice(mut self, voice: Option<String>) -> Self {
        if let Some(voice) = voice.filter(|v| !v.is_empty()) {
            self.default_voice = voice;
        }
        self
    }

    /// Point the provider at a different API root (proxies, tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Model name for the configured tier.
    #[must_use]
    pub fn model(&self) -> &'static str {
        match self.tier {
            ModelTier::Standard => "tts-1",
            ModelTier::Premium => "tts-1-hd",
        }
    }

    /// Get the API key, returning an error if not configured.
    fn get_api_key(&self) -> Result<&Secret<String>> {
        self.api_key
            .as_ref()
            .ok_or_else(|| anyhow!("OpenAI API key not configured"))
    }

    /// Map audio format to OpenAI response format.
    fn response_format(format: AudioFormat) -> &'static str {
        match format {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Opus => "opus",
            AudioFormat::Aac => "aac",
        }
    }
}

#[async_trait]
impl TtsProvider for OpenAiTts {
    fn id(&self) -> &'static str {
        "openai"
    }

    fn name(&self) -> &'static str {
        "OpenAI"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn default_voice(&self) -> &str {
        &self.default_voice
    }

    fn voices(&self) -> Vec<Voice> {
        // Fixed set, no API call needed.
        VOICES
            .iter()
            .map(|(id, desc)| Voice {
                id: (*id).to_string(),
                name: (*id).to_string(),
                description: Some((*desc).to_string()),
            })
            .collect()
    }

    async fn synthesize(&self, request: SynthesizeRequest) -> Result<AudioOutput> {
        let api_key = self.get_api_key()?;
        let voice = self.default_voice.as_str();
        let model = self.model();
        let body = TtsRequest {
            model,
            input: &request.text,
            voice,
            response_format: Some(Self::response_format(request.output_format)),
        };
        debug!(model, voice, chars = request.text.len(), "requesting OpenAI speech");

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .context("failed to send OpenAI TTS request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("OpenAI TTS request failed: {} - {}", status, body));
        }

        let data = response
            .bytes()
            .await
            .context("failed to read OpenAI TTS response")?;

        Ok(AudioOutput {
            data,
            format: request.output_format,
        })
    }
}

// ── API Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a str>,
}
