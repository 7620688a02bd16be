//! Turns an effective config into a ready `GatewayState`.

use std::{path::Path, sync::Arc};

use {
    anyhow::{Context, bail},
    tracing::{debug, info, warn},
    vocalis_auto_reply::Dispatcher,
    vocalis_config::VocalisConfig,
    vocalis_gateway::GatewayState,
    vocalis_media::{BlockStore, InMemoryBlockStore},
    vocalis_telegram::{TelegramConfig, TelegramTransport},
    vocalis_tools::{CapabilityRegistry, GenerateSpeechTool},
    vocalis_voice::{AudioFormat, ModelTier, OpenAiTts, TtsProvider},
};

/// Load config from `path` (or the standard locations) and apply env
/// overrides.
pub fn load_effective_config(path: Option<&Path>) -> anyhow::Result<VocalisConfig> {
    let mut config = match path {
        Some(path) => vocalis_config::load_config(path)?,
        None => vocalis_config::discover_and_load(),
    };
    vocalis_config::apply_env_overrides(&mut config);
    Ok(config)
}

/// Capabilities in priority order. Speech is the only built-in one.
pub fn build_registry(
    config: &VocalisConfig,
    store: Arc<dyn BlockStore>,
) -> anyhow::Result<CapabilityRegistry> {
    let voice = &config.voice;
    if voice.provider != "openai" {
        bail!("unsupported voice provider: {}", voice.provider);
    }
    let format: AudioFormat = voice.format.parse().context("voice.format")?;

    let tier = ModelTier::from_premium_flag(config.bot.use_gpt4);
    let mut tts = OpenAiTts::new(voice.api_key.clone(), tier).with_voice(voice.voice.clone());
    if let Some(base_url) = voice.base_url.as_deref() {
        tts = tts.with_base_url(base_url);
    }
    if !tts.supports_voice(tts.default_voice()) {
        let known: Vec<String> = tts.voices().into_iter().map(|v| v.id).collect();
        bail!(
            "unknown {} voice \"{}\" (available: {})",
            tts.name(),
            tts.default_voice(),
            known.join(", ")
        );
    }
    if !tts.is_configured() {
        warn!(
            provider = tts.id(),
            "no voice API key configured; speech requests will fail"
        );
    }
    debug!(
        model = tts.model(),
        voice = tts.default_voice(),
        ?format,
        "speech capability configured"
    );

    Ok(CapabilityRegistry::new().with(GenerateSpeechTool::new(Arc::new(tts), store, format)))
}

/// Install the metrics recorder when the config asks for it. The handle is
/// only kept when `/metrics` should be served.
#[cfg(feature = "metrics")]
pub fn init_metrics(
    config: &VocalisConfig,
) -> anyhow::Result<Option<vocalis_metrics::MetricsHandle>> {
    let mut global_labels: Vec<(String, String)> = config
        .metrics
        .labels
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    global_labels.sort();
    let handle = vocalis_metrics::init_metrics(vocalis_metrics::MetricsRecorderConfig {
        enabled: config.metrics.enabled,
        global_labels,
    })
    .context("metrics recorder")?;
    Ok(handle.filter(|_| config.metrics.prometheus_endpoint))
}

pub fn build_gateway_state(config: &VocalisConfig) -> anyhow::Result<GatewayState> {
    let store: Arc<dyn BlockStore> =
        Arc::new(InMemoryBlockStore::with_capacity(config.storage.max_blocks));
    let registry = build_registry(config, Arc::clone(&store))?;

    let telegram_config = TelegramConfig {
        token: config.bot.bot_token.clone(),
        api_url: config.bot.api_url.clone(),
    };
    let telegram = TelegramTransport::new(&telegram_config, Arc::clone(&store))
        .context("telegram transport")?;

    info!(capabilities = ?registry.names(), "capability registry ready");
    Ok(
        GatewayState::new(Dispatcher::new(registry, store), Arc::new(telegram))
            .with_public_url(config.server.public_url.clone())
            .with_api_token(config.server.api_token.clone()),
    )
}
