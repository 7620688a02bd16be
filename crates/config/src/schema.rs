/// Config schema types (bot account, HTTP server, voice backend, block
/// storage, metrics).
use std::collections::HashMap;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VocalisConfig {
    pub bot: BotConfig,
    pub server: ServerConfig,
    pub voice: VoiceConfig,
    pub storage: StorageConfig,
    pub metrics: MetricsConfig,
}

/// Telegram bot account.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Bot token from @BotFather. Required.
    #[serde(serialize_with = "serialize_secret")]
    pub bot_token: Secret<String>,
    /// Use the higher quality (and higher cost) model tier where a
    /// capability offers two.
    pub use_gpt4: bool,
    /// Bot API root override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_token: Secret::new(String::new()),
            use_gpt4: false,
            api_url: None,
        }
    }
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"[REDACTED]")
            .field("use_gpt4", &self.use_gpt4)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Gateway server configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on. Defaults to 8084.
    pub port: u16,
    /// Externally reachable base URL; the webhook callback is derived from it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    /// Bearer token guarding the operational endpoints.
    #[serde(
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_token: Option<Secret<String>>,
    /// Run the initialization hook when the gateway starts.
    pub register_on_start: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8084,
            public_url: None,
            api_token: None,
            register_on_start: true,
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind", &self.bind)
            .field("port", &self.port)
            .field("public_url", &self.public_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("register_on_start", &self.register_on_start)
            .finish()
    }
}

/// Text-to-speech backend.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Provider id. Only "openai" is built in.
    pub provider: String,
    #[serde(
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<Secret<String>>,
    /// Voice id; the provider default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    /// Output format: mp3, opus or aac.
    pub format: String,
    /// API root override for proxies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            api_key: None,
            voice: None,
            format: "mp3".into(),
            base_url: None,
        }
    }
}

impl std::fmt::Debug for VoiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("voice", &self.voice)
            .field("format", &self.format)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// In-memory block storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Most blocks kept at once; the oldest is evicted first. Must be at
    /// least 1.
    pub max_blocks: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { max_blocks: 256 }
    }
}

/// Metrics collection. Only takes effect in builds with the `metrics`
/// feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Whether metrics collection is enabled.
    pub enabled: bool,
    /// Whether to expose the `/metrics` Prometheus endpoint.
    pub prometheus_endpoint: bool,
    /// Additional labels to add to all metrics.
    pub labels: HashMap<String, String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prometheus_endpoint: true,
            labels: HashMap::new(),
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}
