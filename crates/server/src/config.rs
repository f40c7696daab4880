//! # Application Configuration
//!
//! This module defines the configuration structure for the `sqlrag-server` (and the
//! `sqlrag-indexer` CLI, which reads the same file) and provides the logic for
//! loading it from a `config.yml` file and environment variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use sqlrag::constants::{DEFAULT_DB_FILE, DEFAULT_SQL_DIALECT, DEFAULT_TOP_K};
use sqlrag::types::{EmbeddingConfig, ProviderConfig};
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The path to the SQLite database file, used when no secret is configured.
    /// Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// Configuration for the text embedding model.
    pub embedding: EmbeddingConfig,
    /// The provider that generates SQL.
    pub generation: ProviderConfig,
    pub translation: TranslationConfig,
    /// Where the database location comes from. Absent means `db_url` is used directly.
    #[serde(default)]
    pub secrets: Option<SecretsConfig>,
}

/// Prompt and retrieval settings for translation requests.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TranslationConfig {
    pub dialect: String,
    pub top_k: usize,
    /// Join hints embedded verbatim in every prompt.
    pub relationship_notes: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackend {
    #[default]
    Env,
    File,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SecretsConfig {
    #[serde(default)]
    pub backend: SecretBackend,
    /// Directory holding `<secret_name>.json` for the `file` backend.
    #[serde(default)]
    pub dir: Option<String>,
    pub secret_name: String,
}

/// Provides a default value for the `port` field if not set in the environment.
fn default_port() -> u16 {
    9090
}

/// Provides a default value for the `db_url` field if not set in the environment.
fn default_db_url() -> String {
    DEFAULT_DB_FILE.to_string()
}

// Helper to read a file, substitute env vars, and return its content.
// Returns Ok(None) if the file does not exist, or an error if it fails to read.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Resolves which main config file to load.
///
/// An explicit path wins. Otherwise `config.yml` next to the crate manifest is used,
/// falling back to `config.{AI_PROVIDER}.yml` (`local` by default).
fn resolve_config_path(config_path_override: Option<&str>) -> String {
    if let Some(override_path) = config_path_override {
        return override_path.to_string();
    }
    let base_path = env!("CARGO_MANIFEST_DIR");
    let user_config_path = format!("{base_path}/config.yml");
    if std::path::Path::new(&user_config_path).exists() {
        info!("Loading user-defined configuration from '{user_config_path}'.");
        user_config_path
    } else {
        let provider = env::var("AI_PROVIDER").unwrap_or_else(|_| "local".to_string());
        let fallback_path = format!("{base_path}/config.{provider}.yml");
        info!("'{user_config_path}' not found. Falling back to '{fallback_path}' based on AI_PROVIDER='{provider}'.");
        fallback_path
    }
}

/// Loads the application configuration from a file and environment variables.
///
/// - Top-level keys like `port` and `db_url` are overridden by `PORT` and `DB_URL`.
/// - Nested keys are overridden by `SQLRAG_...` variables (e.g., `SQLRAG_EMBEDDING__API_URL`).
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults.
        .set_default("translation.dialect", DEFAULT_SQL_DIALECT)?
        .set_default("translation.top_k", DEFAULT_TOP_K as u64)?
        .set_default("translation.relationship_notes", "")?;

    // Layer 2: Main config file.
    let main_config_path = resolve_config_path(config_path_override);
    let main_content = read_and_substitute(&main_config_path)?.ok_or_else(|| {
        ConfigError::NotFound(format!(
            "Main config file not found at '{main_config_path}'. Please ensure 'config.yml' exists or your AI_PROVIDER is set to load a valid template ('local' or 'gemini')."
        ))
    })?;
    builder = builder.add_source(File::from_str(&main_content, FileFormat::Yaml));

    let settings = builder
        // Layer 3: Environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Prefixed environment variables for deeper overrides.
        .add_source(
            Environment::with_prefix("SQLRAG")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    Ok(config)
}
