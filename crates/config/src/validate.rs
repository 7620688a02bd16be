//! Configuration validation.
//!
//! File-level checks ([`validate`], [`validate_toml_str`]) catch syntax
//! errors, unknown or misspelled fields and type mismatches. Semantic checks
//! ([`validate_config`]) run on the effective config after env overrides.

use std::{collections::HashMap, path::Path};

use {secrecy::ExposeSecret, url::Url};

use crate::{env_subst::substitute_env, loader, schema::VocalisConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single diagnostic produced by validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "missing",
    /// "invalid-value", "security"
    pub category: &'static str,
    /// Dotted path, e.g. "server.public_url"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} [{}] {}", self.severity, self.category, self.message)
        } else {
            write!(
                f,
                "{} [{}] {}: {}",
                self.severity, self.category, self.path, self.message
            )
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<std::path::PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

/// Expected shape of the configuration.
enum KnownKeys {
    Struct(HashMap<&'static str, KnownKeys>),
    Leaf,
}

fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Struct};

    Struct(HashMap::from([
        (
            "bot",
            Struct(HashMap::from([
                ("bot_token", Leaf),
                ("use_gpt4", Leaf),
                ("api_url", Leaf),
            ])),
        ),
        (
            "server",
            Struct(HashMap::from([
                ("bind", Leaf),
                ("port", Leaf),
                ("public_url", Leaf),
                ("api_token", Leaf),
                ("register_on_start", Leaf),
            ])),
        ),
        (
            "voice",
            Struct(HashMap::from([
                ("provider", Leaf),
                ("api_key", Leaf),
                ("voice", Leaf),
                ("format", Leaf),
                ("base_url", Leaf),
            ])),
        ),
        ("storage", Struct(HashMap::from([("max_blocks", Leaf)]))),
        (
            "metrics",
            Struct(HashMap::from([
                ("enabled", Leaf),
                ("prometheus_endpoint", Leaf),
                ("labels", Leaf),
            ])),
        ),
    ]))
}

const KNOWN_VOICE_PROVIDERS: &[&str] = &["openai"];
const KNOWN_AUDIO_FORMATS: &[&str] = &["mp3", "mpeg", "opus", "ogg", "aac"];

// ── Levenshtein distance for suggestions ────────────────────────────────────

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// Closest candidate within `max_distance` edits, if any.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    candidates
        .iter()
        .map(|&c| (c, levenshtein(needle, c)))
        .filter(|&(_, d)| d > 0 && d <= max_distance)
        .min_by_key(|&(_, d)| d)
        .map(|(c, _)| c)
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate a config file at the given path, or the discovered config file
/// when `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = path
        .map(Path::to_path_buf)
        .or_else(loader::find_config_file);

    let Some(ref actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic::new(
                Severity::Info,
                "missing",
                "",
                "no config file found; using defaults",
            )],
            config_path: None,
        };
    };

    let content = match std::fs::read_to_string(actual_path) {
        Ok(content) => substitute_env(&content),
        Err(e) => {
            return ValidationResult {
                diagnostics: vec![Diagnostic::new(
                    Severity::Error,
                    "syntax",
                    "",
                    format!("failed to read config file: {e}"),
                )],
                config_path,
            };
        },
    };

    let is_toml = actual_path
        .extension()
        .and_then(|e| e.to_str())
        .is_none_or(|e| e == "toml");
    let mut result = if is_toml {
        validate_toml_str(&content)
    } else {
        let diagnostics = match loader::parse_config(&content, actual_path) {
            Ok(_) => Vec::new(),
            Err(e) => vec![Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                e.to_string(),
            )],
        };
        ValidationResult {
            diagnostics,
            config_path: None,
        }
    };
    result.config_path = config_path;
    result
}

/// Validate a TOML string without touching the file system.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    let mut diagnostics = Vec::new();

    let toml_value: toml::Value = match toml::from_str(toml_str) {
        Ok(v) => v,
        Err(e) => {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                format!("TOML syntax error: {e}"),
            ));
            return ValidationResult {
                diagnostics,
                config_path: None,
            };
        },
    };

    check_unknown_fields(&toml_value, &build_schema_map(), "", &mut diagnostics);

    if let Err(e) = toml::from_str::<VocalisConfig>(toml_str) {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "type-error",
            "",
            format!("type error: {e}"),
        ));
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

fn check_unknown_fields(
    value: &toml::Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (toml::Value::Table(table), KnownKeys::Struct(fields)) = (value, schema) else {
        return;
    };
    let known_keys: Vec<&str> = fields.keys().copied().collect();
    for (key, child_value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match fields.get(key.as_str()) {
            Some(child_schema) => {
                check_unknown_fields(child_value, child_schema, &path, diagnostics);
            },
            None => {
                let message = match suggest(key, &known_keys, 3) {
                    Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
                    None => "unknown field".to_string(),
                };
                diagnostics.push(Diagnostic::new(
                    Severity::Error,
                    "unknown-field",
                    path,
                    message,
                ));
            },
        }
    }
}

/// Semantic checks on an effective config.
#[must_use]
pub fn validate_config(config: &VocalisConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let token = config.bot.bot_token.expose_secret().trim();
    if token.is_empty() {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "missing",
            "bot.bot_token",
            "a Telegram bot token is required",
        ));
    } else if token.starts_with("${") {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "missing",
            "bot.bot_token",
            format!("unresolved placeholder {token}"),
        ));
    }

    if let Some(public_url) = config.server.public_url.as_deref() {
        match Url::parse(public_url) {
            Ok(url) if url.scheme() == "https" => {},
            Ok(url) if url.scheme() == "http" => diagnostics.push(Diagnostic::new(
                Severity::Warning,
                "security",
                "server.public_url",
                "Telegram only delivers webhooks to https URLs",
            )),
            Ok(url) => diagnostics.push(Diagnostic::new(
                Severity::Error,
                "invalid-value",
                "server.public_url",
                format!("unsupported scheme \"{}\"", url.scheme()),
            )),
            Err(e) => diagnostics.push(Diagnostic::new(
                Severity::Error,
                "invalid-value",
                "server.public_url",
                format!("not a valid URL: {e}"),
            )),
        }
    }

    if config.server.api_token.is_none() {
        diagnostics.push(Diagnostic::new(
            Severity::Info,
            "security",
            "server.api_token",
            "no api_token set; /info and /init reject every request",
        ));
    }

    let provider = config.voice.provider.as_str();
    if !KNOWN_VOICE_PROVIDERS.contains(&provider) {
        let hint = suggest(provider, KNOWN_VOICE_PROVIDERS, 3)
            .map(|s| format!(" (did you mean \"{s}\"?)"))
            .unwrap_or_default();
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "invalid-value",
            "voice.provider",
            format!("unknown voice provider \"{provider}\"{hint}"),
        ));
    }

    let format = config.voice.format.to_ascii_lowercase();
    if !KNOWN_AUDIO_FORMATS.contains(&format.as_str()) {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "invalid-value",
            "voice.format",
            format!("unsupported audio format \"{}\"", config.voice.format),
        ));
    }

    if config.storage.max_blocks == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "invalid-value",
            "storage.max_blocks",
            "must keep at least one block",
        ));
    }

    if config.voice.api_key.is_none() {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "missing",
            "voice.api_key",
            "no voice API key; speech requests will fail",
        ));
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, secrecy::Secret};

    fn valid_config() -> VocalisConfig {
        let mut cfg = VocalisConfig::default();
        cfg.bot.bot_token = Secret::new("123:ABC".into());
        cfg.voice.api_key = Some(Secret::new("sk-test".into()));
        cfg.server.public_url = Some("https://bot.example.com".into());
        cfg.server.api_token = Some(Secret::new("ops".into()));
        cfg
    }

    #[rstest]
    #[case("hello", "hello", 0)]
    #[case("", "abc", 3)]
    #[case("server", "sever", 1)]
    #[case("cat", "car", 1)]
    #[case("serer", "server", 1)]
    fn levenshtein_distances(#[case] a: &str, #[case] b: &str, #[case] expected: usize) {
        assert_eq!(levenshtein(a, b), expected);
    }

    #[test]
    fn unknown_top_level_key_with_suggestion() {
        let result = validate_toml_str("sever = 42\n");
        let unknown = result
            .diagnostics
            .iter()
            .find(|d| d.category == "unknown-field" && d.path == "sever")
            .unwrap();
        assert!(unknown.message.contains("server"));
    }

    #[test]
    fn unknown_nested_key_with_suggestion() {
        let result = validate_toml_str("[bot]\nbot_tokn = \"1:A\"\n");
        let unknown = result
            .diagnostics
            .iter()
            .find(|d| d.path == "bot.bot_tokn")
            .unwrap();
        assert!(unknown.message.contains("bot_token"));
        assert!(result.has_errors());
    }

    #[test]
    fn syntax_error_detected() {
        let result = validate_toml_str("[bot\n");
        assert_eq!(result.diagnostics[0].category, "syntax");
    }

    #[test]
    fn type_error_detected() {
        let result = validate_toml_str("[server]\nport = \"eighty\"\n");
        assert!(result.diagnostics.iter().any(|d| d.category == "type-error"));
    }

    #[test]
    fn full_valid_file_has_no_diagnostics() {
        let result = validate_toml_str(
            r#"
[bot]
bot_token = "123:ABC"
use_gpt4 = true

[server]
bind = "0.0.0.0"
port = 8084
public_url = "https://bot.example.com"
api_token = "ops"
register_on_start = false

[voice]
provider = "openai"
api_key = "sk-test"
voice = "nova"
format = "opus"
"#,
        );
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn validate_reports_non_toml_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocalis.json");
        std::fs::write(&path, "{ not json").unwrap();
        let result = validate(Some(&path));
        assert!(result.has_errors());
        assert_eq!(result.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn valid_config_is_clean() {
        assert!(validate_config(&valid_config()).is_empty());
    }

    #[test]
    fn empty_token_is_error() {
        let mut cfg = valid_config();
        cfg.bot.bot_token = Secret::new(String::new());
        let diags = validate_config(&cfg);
        assert!(
            diags
                .iter()
                .any(|d| d.severity == Severity::Error && d.path == "bot.bot_token")
        );
    }

    #[test]
    fn unresolved_placeholder_token_is_error() {
        let mut cfg = valid_config();
        cfg.bot.bot_token = Secret::new("${TELEGRAM_BOT_TOKEN}".into());
        assert!(
            validate_config(&cfg)
                .iter()
                .any(|d| d.path == "bot.bot_token")
        );
    }

    #[rstest]
    #[case("not a url", Severity::Error)]
    #[case("ftp://bot.example.com", Severity::Error)]
    #[case("http://bot.example.com", Severity::Warning)]
    fn public_url_checks(#[case] url: &str, #[case] severity: Severity) {
        let mut cfg = valid_config();
        cfg.server.public_url = Some(url.into());
        let diags = validate_config(&cfg);
        let diag = diags
            .iter()
            .find(|d| d.path == "server.public_url")
            .unwrap();
        assert_eq!(diag.severity, severity);
    }

    #[test]
    fn missing_voice_key_is_warning() {
        let mut cfg = valid_config();
        cfg.voice.api_key = None;
        let diags = validate_config(&cfg);
        let diag = diags.iter().find(|d| d.path == "voice.api_key").unwrap();
        assert_eq!(diag.severity, Severity::Warning);
    }

    #[test]
    fn missing_api_token_disables_operational_endpoints() {
        let mut cfg = valid_config();
        cfg.server.api_token = None;
        let diags = validate_config(&cfg);
        let diag = diags
            .iter()
            .find(|d| d.category == "security" && d.path == "server.api_token")
            .unwrap();
        assert_eq!(diag.severity, Severity::Info);
        assert!(diag.message.contains("reject"));
    }

    #[test]
    fn zero_max_blocks_is_error() {
        let mut cfg = valid_config();
        cfg.storage.max_blocks = 0;
        let diags = validate_config(&cfg);
        let diag = diags
            .iter()
            .find(|d| d.path == "storage.max_blocks")
            .unwrap();
        assert_eq!(diag.severity, Severity::Error);
    }

    #[test]
    fn storage_and_metrics_keys_are_known() {
        let result = validate_toml_str(
            "[storage]\nmax_blocks = 64\n\n[metrics]\nenabled = false\nlabels = { region = \"eu\" }\n",
        );
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);

        let result = validate_toml_str("[storage]\nmax_block = 64\n");
        let unknown = result
            .diagnostics
            .iter()
            .find(|d| d.path == "storage.max_block")
            .unwrap();
        assert!(unknown.message.contains("max_blocks"));
    }

    #[test]
    fn misspelled_provider_gets_suggestion() {
        let mut cfg = valid_config();
        cfg.voice.provider = "opnai".into();
        let diags = validate_config(&cfg);
        let diag = diags.iter().find(|d| d.path == "voice.provider").unwrap();
        assert!(diag.message.contains("did you mean \"openai\""));
    }

    #[test]
    fn unknown_format_is_error() {
        let mut cfg = valid_config();
        cfg.voice.format = "flac".into();
        assert!(validate_config(&cfg).iter().any(|d| d.path == "voice.format"));
    }
}
