//! Host configuration file loading with precedence handling.
//!
//! The terminal host reads default attributes and transport settings from
//! `~/.config/factcard/config.toml`, then layers env vars and CLI flags on top.

use crate::config::attributes::{AttributeMap, ATTR_SRC};
use crate::model::Credentials;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default request timeout for pull acquisitions.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
/// Default content of the `button-title` slot.
pub const DEFAULT_BUTTON_TITLE: &str = "Next fact";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigFileError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/factcard/config.toml`:
///
/// ```toml
/// request_timeout_ms = 5000
/// button_title = "Another one"
///
/// [attributes]
/// src = "https://catfact.ninja/fact"
/// auto-refresh = "true"
/// refresh-interval = "3000"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Default widget attributes (raw strings, validated at attach).
    #[serde(default)]
    pub attributes: Option<BTreeMap<String, String>>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Pull request timeout in milliseconds.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// User-Agent header sent by both transports.
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Opaque `Authorization` header value passed through to both transports.
    #[serde(default)]
    pub credentials: Option<Credentials>,

    /// Content placed in the manual trigger's `button-title` slot.
    #[serde(default)]
    pub button_title: Option<String>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Attribute snapshot handed to the widget on attach.
    pub attributes: AttributeMap,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Pull request timeout.
    pub request_timeout: Duration,
    /// User-Agent header.
    pub user_agent: String,
    /// Pass-through credentials.
    pub credentials: Option<Credentials>,
    /// Manual trigger slot content.
    pub button_title: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            attributes: AttributeMap::new(),
            log_file_path: default_log_path(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            user_agent: default_user_agent(),
            credentials: None,
            button_title: DEFAULT_BUTTON_TITLE.to_string(),
        }
    }
}

fn default_user_agent() -> String {
    format!("factcard/{}", env!("CARGO_PKG_VERSION"))
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/factcard/factcard.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("factcard").join("factcard.log")
    } else {
        PathBuf::from("factcard.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigFileError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigFileError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigFileError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/factcard/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("factcard").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `FACTCARD_CONFIG` environment variable
/// 3. Default path `~/.config/factcard/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigFileError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("FACTCARD_CONFIG") {
        if env_path.is_empty() {
            return Err(ConfigFileError::InvalidPath(
                "FACTCARD_CONFIG is set but empty".to_string(),
            ));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `FACTCARD_SRC`: Override the `src` attribute
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(src) = std::env::var("FACTCARD_SRC") {
        config.attributes.set(ATTR_SRC, src);
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        attributes: config
            .attributes
            .map(AttributeMap::from_pairs)
            .unwrap_or(defaults.attributes),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        request_timeout: config
            .request_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.request_timeout),
        user_agent: config.user_agent.unwrap_or(defaults.user_agent),
        credentials: config.credentials.or(defaults.credentials),
        button_title: config.button_title.unwrap_or(defaults.button_title),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Attributes are overlaid one by one, so a config file `key` survives a CLI `--src`.
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    attribute_overrides: &AttributeMap,
    button_title_override: Option<String>,
) -> ResolvedConfig {
    config.attributes = config.attributes.merged_with(attribute_overrides);

    if let Some(title) = button_title_override {
        config.button_title = title;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
