//! Configuration loading, validation, and env substitution.
//!
//! Config files: `vocalis.toml`, `vocalis.yaml`, `vocalis.yml` or
//! `vocalis.json`, searched in `./` then the user config directory
//! (`~/.config/vocalis/` on Linux).
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw
//! file, and a fixed set of `VOCALIS_*` environment overrides.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        apply_env_overrides, apply_env_overrides_with, config_dir, discover_and_load,
        find_config_file, load_config,
    },
    schema::{
        BotConfig, MetricsConfig, ServerConfig, StorageConfig, VocalisConfig, VoiceConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate, validate_config},
};
