//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.xenia.toml` files. API keys are never read from the file; they come
//! from the command line or the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".xenia.toml";

/// Shortest comment (trimmed, in characters) allowed to reach the analyzer.
pub const MIN_COMMENT_CHARS: usize = 10;

/// Longest scoring input, kept under the model's 512-token window.
pub const MAX_INPUT_CHARS: usize = 500;

/// Most examples reported per label.
pub const MAX_TOP_K: usize = 5;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Comment source settings.
    #[serde(default)]
    pub youtube: YouTubeConfig,

    /// Sentiment model settings.
    #[serde(default)]
    pub sentiment: SentimentConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_address")]
    pub address: String,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

/// YouTube Data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YouTubeConfig {
    /// Base URL of the Data API v3.
    #[serde(default = "default_youtube_url")]
    pub api_base_url: String,

    /// Comments shorter than this (after trimming) are dropped.
    #[serde(default = "default_min_comment_chars")]
    pub min_comment_chars: usize,

    /// Per-call timeout in seconds.
    #[serde(default = "default_youtube_timeout")]
    pub timeout_seconds: u64,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_youtube_url(),
            min_comment_chars: default_min_comment_chars(),
            timeout_seconds: default_youtube_timeout(),
        }
    }
}

fn default_youtube_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_min_comment_chars() -> usize {
    MIN_COMMENT_CHARS
}

fn default_youtube_timeout() -> u64 {
    30
}

/// Sentiment model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// HuggingFace model ID.
    #[serde(default = "default_model")]
    pub model: String,

    /// HuggingFace Inference API URL.
    #[serde(default = "default_hf_url")]
    pub api_base_url: String,

    /// Comments per scorer call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Characters of each comment sent to the model.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Examples kept per label.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Per-call timeout in seconds.
    #[serde(default = "default_hf_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base_url: default_hf_url(),
            batch_size: default_batch_size(),
            max_input_chars: default_max_input_chars(),
            top_k: default_top_k(),
            timeout_seconds: default_hf_timeout(),
        }
    }
}

fn default_model() -> String {
    "distilbert-base-uncased-finetuned-sst-2-english".to_string()
}

fn default_hf_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_batch_size() -> usize {
    8
}

fn default_max_input_chars() -> usize {
    MAX_INPUT_CHARS
}

fn default_top_k() -> usize {
    MAX_TOP_K
}

fn default_hf_timeout() -> u64 {
    60
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref bind) = args.bind {
            self.server.address = bind.clone();
        }
        if let Some(ref model) = args.model {
            self.sentiment.model = model.clone();
        }
        if let Some(batch_size) = args.batch_size {
            self.sentiment.batch_size = batch_size;
        }
    }

    /// Check values the services cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.sentiment.batch_size == 0 {
            anyhow::bail!("sentiment.batch_size must be at least 1");
        }
        if !(1..=MAX_INPUT_CHARS).contains(&self.sentiment.max_input_chars) {
            anyhow::bail!(
                "sentiment.max_input_chars must be between 1 and {}",
                MAX_INPUT_CHARS
            );
        }
        if !(1..=MAX_TOP_K).contains(&self.sentiment.top_k) {
            anyhow::bail!("sentiment.top_k must be between 1 and {}", MAX_TOP_K);
        }
        if self.youtube.min_comment_chars < MIN_COMMENT_CHARS {
            anyhow::bail!(
                "youtube.min_comment_chars must be at least {}",
                MIN_COMMENT_CHARS
            );
        }
        if self.server.request_timeout_seconds == 0 {
            anyhow::bail!("server.request_timeout_seconds must be at least 1");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
