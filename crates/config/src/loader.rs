use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::VocalisConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "vocalis.toml",
    "vocalis.yaml",
    "vocalis.yml",
    "vocalis.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<VocalisConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./vocalis.{toml,yaml,yml,json}` (project-local)
/// 2. `<user config dir>/vocalis.{toml,yaml,yml,json}` (user-global)
///
/// Returns `VocalisConfig::default()` if no config file is found or the file
/// fails to parse.
pub fn discover_and_load() -> VocalisConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    VocalisConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists());
    if local.is_some() {
        return local;
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "vocalis").map(|d| d.config_dir().to_path_buf())
}

/// Apply `VOCALIS_*` (and `OPENAI_API_KEY`) overrides from the process
/// environment.
pub fn apply_env_overrides(config: &mut VocalisConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

/// Apply environment overrides using a custom lookup. Empty values are
/// ignored.
pub fn apply_env_overrides_with(
    config: &mut VocalisConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(token) = get("VOCALIS_BOT_TOKEN") {
        config.bot.bot_token = Secret::new(token);
    }
    if let Some(flag) = get("VOCALIS_USE_GPT4") {
        match parse_bool(&flag) {
            Some(value) => config.bot.use_gpt4 = value,
            None => warn!(value = %flag, "ignoring unparsable VOCALIS_USE_GPT4"),
        }
    }
    if let Some(url) = get("VOCALIS_PUBLIC_URL") {
        config.server.public_url = Some(url);
    }
    if let Some(token) = get("VOCALIS_API_TOKEN") {
        config.server.api_token = Some(Secret::new(token));
    }
    if config.voice.api_key.is_none()
        && let Some(key) = get("OPENAI_API_KEY")
    {
        config.voice.api_key = Some(Secret::new(key));
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub(crate) fn parse_config(raw: &str, path: &Path) -> anyhow::Result<VocalisConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[cfg(test)]
mod tests {
    use {super::*, secrecy::ExposeSecret};

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocalis.toml");
        std::fs::write(
            &path,
            r#"
[bot]
bot_token = "123:ABC"

[server]
port = 9000
public_url = "https://bot.example.com"
"#,
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.bot.bot_token.expose_secret(), "123:ABC");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(
            cfg.server.public_url.as_deref(),
            Some("https://bot.example.com")
        );
    }

    #[test]
    fn loads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("vocalis.yaml");
        std::fs::write(&yaml, "bot:\n  bot_token: \"1:Y\"\n  use_gpt4: true\n").unwrap();
        let cfg = load_config(&yaml).unwrap();
        assert_eq!(cfg.bot.bot_token.expose_secret(), "1:Y");
        assert!(cfg.bot.use_gpt4);

        let json = dir.path().join("vocalis.json");
        std::fs::write(&json, r#"{"voice": {"format": "opus"}}"#).unwrap();
        let cfg = load_config(&json).unwrap();
        assert_eq!(cfg.voice.format, "opus");
    }

    #[test]
    fn unsupported_extension_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocalis.ini");
        std::fs::write(&path, "bot_token=1").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join("nope.toml")).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = VocalisConfig::default();
        apply_env_overrides_with(&mut cfg, |name| match name {
            "VOCALIS_BOT_TOKEN" => Some("9:ENV".into()),
            "VOCALIS_USE_GPT4" => Some("yes".into()),
            "VOCALIS_PUBLIC_URL" => Some("https://env.example.com".into()),
            "VOCALIS_API_TOKEN" => Some("ops".into()),
            "OPENAI_API_KEY" => Some("sk-env".into()),
            _ => None,
        });
        assert_eq!(cfg.bot.bot_token.expose_secret(), "9:ENV");
        assert!(cfg.bot.use_gpt4);
        assert_eq!(
            cfg.server.public_url.as_deref(),
            Some("https://env.example.com")
        );
        assert_eq!(
            cfg.server.api_token.as_ref().map(|t| t.expose_secret().as_str()),
            Some("ops")
        );
        assert_eq!(
            cfg.voice.api_key.as_ref().map(|t| t.expose_secret().as_str()),
            Some("sk-env")
        );
    }

    #[test]
    fn env_overrides_skip_empty_and_invalid() {
        let mut cfg = VocalisConfig::default();
        cfg.bot.bot_token = Secret::new("file-token".into());
        cfg.bot.use_gpt4 = true;
        cfg.voice.api_key = Some(Secret::new("sk-file".into()));
        apply_env_overrides_with(&mut cfg, |name| match name {
            "VOCALIS_BOT_TOKEN" => Some("  ".into()),
            "VOCALIS_USE_GPT4" => Some("maybe".into()),
            "OPENAI_API_KEY" => Some("sk-env".into()),
            _ => None,
        });
        assert_eq!(cfg.bot.bot_token.expose_secret(), "file-token");
        assert!(cfg.bot.use_gpt4);
        assert_eq!(
            cfg.voice.api_key.as_ref().map(|t| t.expose_secret().as_str()),
            Some("sk-file")
        );
    }
}
