//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{MAX_COMMENTS, MIN_COMMENTS};
use clap::Parser;
use std::path::PathBuf;

/// Xenia - YouTube comment sentiment analysis
///
/// Serves an HTTP API that fetches a video's comments, classifies each one
/// with a pre-trained sentiment model, and returns a summary. With
/// --analyze it runs a single analysis and writes a report instead.
///
/// Examples:
///   xenia --bind 0.0.0.0:8000
///   xenia --analyze https://youtu.be/dQw4w9WgXcQ --format json
///   xenia --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .xenia.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to serve the HTTP API on (overrides config)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub youtube_api_key: Option<String>,

    /// HuggingFace Inference API token
    #[arg(long, env = "HF_API_KEY", hide_env_values = true)]
    pub hf_api_key: Option<String>,

    /// Sentiment model ID (overrides config)
    #[arg(short, long, env = "XENIA_MODEL")]
    pub model: Option<String>,

    /// Comments per scorer call (overrides config)
    #[arg(long, value_name = "NUM")]
    pub batch_size: Option<usize>,

    /// Analyze one video URL and exit instead of serving
    #[arg(short, long, value_name = "URL")]
    pub analyze: Option<String>,

    /// Maximum comments to analyze with --analyze
    #[arg(long, default_value = "100", value_name = "COUNT")]
    pub max_comments: usize,

    /// Output format for --analyze (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file for --analyze
    #[arg(short, long, default_value = "xenia_report.md", value_name = "FILE")]
    pub output: PathBuf,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .xenia.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(batch_size) = self.batch_size {
            if batch_size == 0 {
                return Err("Batch size must be at least 1".to_string());
            }
        }

        if self.analyze.is_some() && !(MIN_COMMENTS..=MAX_COMMENTS).contains(&self.max_comments)
        {
            return Err(format!(
                "Max comments must be between {} and {}",
                MIN_COMMENTS, MAX_COMMENTS
            ));
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
