//! HTTP API.
//!
//! Services are constructed once at startup and shared with every request
//! through [`AppState`]. A service that could not be constructed is left
//! empty and reported as unavailable.

mod handlers;

use crate::analysis::SentimentAnalyzer;
use crate::config::ServerConfig;
use crate::error::{Result, XeniaError};
use crate::models::{AnalysisRequest, AnalysisResponse};
use crate::source::{extract_video_id, CommentSource};
use anyhow::Context;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared, read-only services.
#[derive(Clone, Default)]
pub struct AppState {
    pub source: Option<Arc<dyn CommentSource>>,
    pub analyzer: Option<Arc<SentimentAnalyzer>>,
}

impl AppState {
    pub fn new(
        source: Option<Arc<dyn CommentSource>>,
        analyzer: Option<Arc<SentimentAnalyzer>>,
    ) -> Self {
        Self { source, analyzer }
    }

    pub fn is_ready(&self) -> bool {
        self.source.is_some() && self.analyzer.is_some()
    }

    /// Fetch, score, and summarize the comments of one video.
    pub async fn analyze_video(&self, request: &AnalysisRequest) -> Result<AnalysisResponse> {
        let start_time = Instant::now();

        let (Some(source), Some(analyzer)) = (&self.source, &self.analyzer) else {
            return Err(XeniaError::Unavailable(
                "Services are still initializing. Please wait a moment and try again.",
            ));
        };

        request.validate()?;

        let video_id = extract_video_id(&request.video_url)?;
        info!("Analyzing video {}", video_id);

        let (comments, video) = futures::join!(
            source.fetch_comments(&video_id, request.max_comments),
            source.video_info(&video_id)
        );
        let comments = comments?;
        info!("Fetched {} comments", comments.len());

        if comments.is_empty() {
            return Err(XeniaError::NotFound(
                "No comments found. Video may have comments disabled or no comments yet."
                    .to_string(),
            ));
        }

        let result = analyzer.analyze(&comments).await?;
        info!("Analysis complete in {}s", result.processing_time_seconds);

        Ok(AnalysisResponse::new(
            video_id,
            video,
            result,
            start_time.elapsed().as_secs_f64(),
        ))
    }
}

/// Build the API router.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/analyze", post(handlers::analyze))
        .route("/test", get(handlers::test_endpoint))
        .route("/test-sentiment", post(handlers::test_sentiment))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .address
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.address))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on http://{}", addr);

    let app = router(state, Duration::from_secs(config.request_timeout_seconds));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
