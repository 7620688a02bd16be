//! Text-to-Speech provider abstraction and implementations.

mod openai;

pub use openai::OpenAiTts;

use {
    anyhow::{Result, anyhow},
    async_trait::async_trait,
    bytes::Bytes,
    serde::{Deserialize, Serialize},
};

/// A voice available from a TTS provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voice {
    /// Provider-specific voice identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Optional description or tags.
    pub description: Option<String>,
}

/// Audio output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 format (widely compatible).
    #[default]
    Mp3,
    /// Opus in OGG container (good for Telegram voice notes).
    Opus,
    /// AAC format.
    Aac,
}

impl AudioFormat {
    /// MIME type for this format.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Opus => "audio/ogg",
            Self::Aac => "audio/aac",
        }
    }

    /// File extension for this format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "ogg",
            Self::Aac => "aac",
        }
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" | "mpeg" => Ok(Self::Mp3),
            "opus" | "ogg" => Ok(Self::Opus),
            "aac" => Ok(Self::Aac),
            other => Err(anyhow!("unsupported audio format: {other}")),
        }
    }
}

/// Cost/quality tier of the backing model.
///
/// Providers with a single model ignore the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelTier {
    #[default]
    Standard,
    /// Higher quality at higher cost and latency.
    Premium,
}

impl ModelTier {
    #[must_use]
    pub fn from_premium_flag(premium: bool) -> Self {
        if premium {
            Self::Premium
        } else {
            Self::Standard
        }
    }
}

/// Request to synthesize speech from text in the provider's default voice.
#[derive(Debug, Clone, Default)]
pub struct SynthesizeRequest {
    /// Text to convert to speech.
    pub text: String,
    /// Output audio format.
    pub output_format: AudioFormat,
}

/// Audio output from TTS synthesis.
#[derive(Debug, Clone)]
pub struct AudioOutput {
    /// Raw audio data.
    pub data: Bytes,
    /// Audio format.
    pub format: AudioFormat,
}

/// Text-to-Speech provider trait.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Provider identifier (e.g., "openai").
    fn id(&self) -> &'static str;

    /// Human-readable provider name.
    fn name(&self) -> &'static str;

    /// Check if the provider is configured and ready.
    fn is_configured(&self) -> bool;

    /// Voice every request is spoken in.
    fn default_voice(&self) -> &str;

    /// Voices this provider can speak in.
    fn voices(&self) -> Vec<Voice>;

    /// Whether `id` names one of [`TtsProvider::voices`].
    fn supports_voice(&self, id: &str) -> bool {
        self.voices().iter().any(|v| v.id == id)
    }

    /// Convert text to speech.
    async fn synthesize(&self, request: SynthesizeRequest) -> Result<AudioOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_format_mime_type() {
        assert_eq!(AudioFormat::Mp3.mime_type(), "audio/mpeg");
        assert_eq!(AudioFormat::Opus.mime_type(), "audio/ogg");
    }

    #[test]
    fn test_audio_format_extension() {
        assert_eq!(AudioFormat::Mp3.extension(), "mp3");
        assert_eq!(AudioFormat::Opus.extension(), "ogg");
    }

    #[test]
    fn test_audio_format_from_str() {
        assert_eq!("MP3".parse::<AudioFormat>().unwrap(), AudioFormat::Mp3);
        assert_eq!("ogg".parse::<AudioFormat>().unwrap(), AudioFormat::Opus);
        assert!("flac".parse::<AudioFormat>().is_err());
    }

    #[test]
    fn test_model_tier_from_flag() {
        assert_eq!(ModelTier::from_premium_flag(true), ModelTier::Premium);
        assert_eq!(ModelTier::from_premium_flag(false), ModelTier::Standard);
    }

    #[test]
    fn test_synthesize_request_default() {
        let req = SynthesizeRequest::default();
        assert!(req.text.is_empty());
        assert_eq!(req.output_format, AudioFormat::Mp3);
    }
}
