//! Configuration management for Offchat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{OffchatError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for Offchat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Inference backend configuration
    #[serde(default)]
    pub inference: InferenceConfig,
    /// Chat session configuration
    #[serde(default)]
    pub session: SessionConfig,
}

/// Inference backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_host")]
    pub host: String,

    /// Model selected when a session starts
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Timeout for completion requests (milliseconds)
    #[serde(default = "default_generate_timeout_ms")]
    pub generate_timeout_ms: u64,

    /// Timeout for catalog, show, and health requests (milliseconds)
    #[serde(default = "default_metadata_timeout_ms")]
    pub metadata_timeout_ms: u64,

    /// Short model names rewritten to a concrete tag before a request is sent
    #[serde(default = "default_model_aliases")]
    pub model_aliases: BTreeMap<String, String>,
}

fn default_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "phi3".to_string()
}

fn default_generate_timeout_ms() -> u64 {
    60_000
}

fn default_metadata_timeout_ms() -> u64 {
    5_000
}

fn default_model_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([("qwen3".to_string(), "qwen3:0.6b".to_string())])
}

impl InferenceConfig {
    /// Completion timeout as a `Duration`
    pub fn generate_timeout(&self) -> Duration {
        Duration::from_millis(self.generate_timeout_ms)
    }

    /// Metadata request timeout as a `Duration`
    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_millis(self.metadata_timeout_ms)
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            default_model: default_model(),
            generate_timeout_ms: default_generate_timeout_ms(),
            metadata_timeout_ms: default_metadata_timeout_ms(),
            model_aliases: default_model_aliases(),
        }
    }
}

/// Chat session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Synthetic assistant message that opens every fresh conversation
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Maximum archived chats retained before the oldest is evicted
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Number of most recent archived chats surfaced to search and selection
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,

    /// Maximum characters taken from the first user message for a title
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,
}

fn default_greeting() -> String {
    "Hello! I'm your AI assistant. How can I help you today?".to_string()
}

fn default_history_capacity() -> usize {
    50
}

fn default_recent_window() -> usize {
    5
}

fn default_title_max_chars() -> usize {
    30
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            history_capacity: default_history_capacity(),
            recent_window: default_recent_window(),
            title_max_chars: default_title_max_chars(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| OffchatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| OffchatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(host) = std::env::var("OFFCHAT_HOST") {
            tracing::debug!(host = %host, "Env override: OFFCHAT_HOST");
            self.inference.host = host;
        }

        if let Ok(model) = std::env::var("OFFCHAT_MODEL") {
            tracing::debug!(model = %model, "Env override: OFFCHAT_MODEL");
            self.inference.default_model = model;
        }

        if let Ok(timeout) = std::env::var("OFFCHAT_GENERATE_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(v) => self.inference.generate_timeout_ms = v,
                Err(_) => tracing::warn!("Invalid OFFCHAT_GENERATE_TIMEOUT_MS: {}", timeout),
            }
        }

        if let Ok(timeout) = std::env::var("OFFCHAT_METADATA_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(v) => self.inference.metadata_timeout_ms = v,
                Err(_) => tracing::warn!("Invalid OFFCHAT_METADATA_TIMEOUT_MS: {}", timeout),
            }
        }

        if let Ok(capacity) = std::env::var("OFFCHAT_HISTORY_CAPACITY") {
            match capacity.parse::<usize>() {
                Ok(v) => self.session.history_capacity = v,
                Err(_) => tracing::warn!("Invalid OFFCHAT_HISTORY_CAPACITY: {}", capacity),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(host) = &cli.host {
            self.inference.host = host.clone();
        }

        if let Some(model) = &cli.model {
            self.inference.default_model = model.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let inference = &self.inference;

        if inference.host.trim().is_empty() {
            return Err(OffchatError::Config("inference.host cannot be empty".to_string()).into());
        }

        if !inference.host.starts_with("http://") && !inference.host.starts_with("https://") {
            return Err(OffchatError::Config(format!(
                "inference.host must start with http:// or https://: {}",
                inference.host
            ))
            .into());
        }

        if inference.default_model.trim().is_empty() {
            return Err(
                OffchatError::Config("inference.default_model cannot be empty".to_string()).into(),
            );
        }

        if inference.generate_timeout_ms == 0 {
            return Err(OffchatError::Config(
                "inference.generate_timeout_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if inference.metadata_timeout_ms == 0 {
            return Err(OffchatError::Config(
                "inference.metadata_timeout_ms must be greater than 0".to_string(),
            )
            .into());
        }

        for (alias, target) in &inference.model_aliases {
            if alias.trim().is_empty() || target.trim().is_empty() {
                return Err(OffchatError::Config(format!(
                    "inference.model_aliases entries must be non-empty: '{}' -> '{}'",
                    alias, target
                ))
                .into());
            }
        }

        let session = &self.session;

        if session.history_capacity == 0 {
            return Err(OffchatError::Config(
                "session.history_capacity must be greater than 0".to_string(),
            )
            .into());
        }

        if session.recent_window == 0 {
            return Err(OffchatError::Config(
                "session.recent_window must be greater than 0".to_string(),
            )
            .into());
        }

        if session.recent_window > session.history_capacity {
            return Err(OffchatError::Config(
                "session.recent_window must not exceed session.history_capacity".to_string(),
            )
            .into());
        }

        if session.title_max_chars == 0 {
            return Err(OffchatError::Config(
                "session.title_max_chars must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
