//! Xenia - YouTube comment sentiment analysis
//!
//! Fetches a video's comments from the YouTube Data API, classifies each
//! one with a hosted sentiment model, and summarizes the results, either
//! over an HTTP API or as a one-shot CLI report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (configuration, upstream failure, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod scoring;
mod server;
mod source;

use analysis::SentimentAnalyzer;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use models::{AnalysisRequest, Report, ReportMetadata};
use scoring::HuggingFaceScorer;
use server::AppState;
use source::{CommentSource, YouTubeClient};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Xenia v{}", env!("CARGO_PKG_VERSION"));
    debug!(
        "Arguments: config={:?} bind={:?} analyze={:?}",
        args.config, args.bind, args.analyze
    );

    if let Err(e) = run(args).await {
        error!("Xenia failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .xenia.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  .xenia.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .xenia.toml")?;

    println!("✅ Created .xenia.toml with default settings.");
    println!("   Edit it to customize the model, batch size, and server address.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration, build the services, then serve or analyze once.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let state = build_state(&config, &args)?;

    match args.analyze {
        Some(ref url) => analyze_once(&state, &args, url, &config).await,
        None => server::serve(state, &config.server).await,
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

/// Construct the shared services once. A missing API key leaves the
/// corresponding service out, and requests needing it get 503.
fn build_state(config: &Config, args: &Args) -> Result<AppState> {
    let source: Option<Arc<dyn CommentSource>> = match args.youtube_api_key {
        Some(ref key) => {
            let client = YouTubeClient::new(key.clone(), &config.youtube)
                .context("Failed to initialize YouTube service")?;
            info!("YouTube service initialized");
            Some(Arc::new(client))
        }
        None => {
            warn!("YOUTUBE_API_KEY not set; /analyze will report the service as unavailable");
            None
        }
    };

    let analyzer = match args.hf_api_key {
        Some(ref key) => {
            let scorer = HuggingFaceScorer::new(key.clone(), &config.sentiment)
                .context("Failed to initialize sentiment service")?;
            info!("Sentiment service initialized (model {})", config.sentiment.model);
            Some(Arc::new(SentimentAnalyzer::new(Arc::new(scorer), &config.sentiment)))
        }
        None => {
            warn!("HF_API_KEY not set; sentiment endpoints will report the service as unavailable");
            None
        }
    };

    Ok(AppState::new(source, analyzer))
}

/// Handle --analyze: run one analysis and write the report.
async fn analyze_once(state: &AppState, args: &Args, url: &str, config: &Config) -> Result<()> {
    println!("📥 Fetching up to {} comments for {}", args.max_comments, url);

    let request = AnalysisRequest {
        video_url: url.to_string(),
        max_comments: args.max_comments,
    };
    let analysis = state.analyze_video(&request).await?;
    let model_used = state
        .analyzer
        .as_ref()
        .map(|a| a.model_name().to_string())
        .unwrap_or_else(|| config.sentiment.model.clone());

    let report = Report {
        metadata: ReportMetadata {
            video_url: url.to_string(),
            analysis_date: Utc::now(),
            model_used,
            max_comments: args.max_comments,
        },
        analysis,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;

    let dist = &report.analysis.sentiment_distribution;
    println!("\n📊 Sentiment Summary:");
    println!("   Comments analyzed: {}", report.analysis.total_comments);
    println!(
        "   - 😊 Positive: {} | 😠 Negative: {}",
        dist.positive, dist.negative
    );
    println!("   Duration: {:.2}s", report.analysis.processing_time_seconds);
    println!("\n✅ Report saved to: {}", args.output.display());

    Ok(())
}
