//! Request handlers.

use super::AppState;
use crate::error::XeniaError;
use crate::models::{AnalysisRequest, AnalysisResponse, ClassifiedComment, HealthResponse};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

impl IntoResponse for XeniaError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

pub async fn root() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Xenia API is running! Use POST /analyze to analyze videos.".to_string(),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, message) = if state.is_ready() {
        ("healthy", "All services ready")
    } else {
        ("initializing", "Services loading...")
    };

    Json(HealthResponse {
        status: status.to_string(),
        message: message.to_string(),
    })
}

/// Undecodable bodies and queries are input errors, not 422s.
fn invalid_input<R: std::fmt::Display>(rejection: R) -> XeniaError {
    XeniaError::InvalidInput(rejection.to_string())
}

pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, XeniaError> {
    let Json(request) = payload.map_err(invalid_input)?;
    info!(
        "Analyze request for {} (max {} comments)",
        request.video_url, request.max_comments
    );
    let response = state.analyze_video(&request).await?;
    info!("Request completed in {}s", response.processing_time_seconds);
    Ok(Json(response))
}

pub async fn test_endpoint(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "API is working!",
        "youtube_service_ready": state.source.is_some(),
        "sentiment_service_ready": state.analyzer.is_some(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct TextQuery {
    text: String,
}

/// Score one ad-hoc text; for diagnostics.
pub async fn test_sentiment(
    State(state): State<AppState>,
    query: Result<Query<TextQuery>, QueryRejection>,
) -> Result<Json<ClassifiedComment>, XeniaError> {
    let Query(query) = query.map_err(invalid_input)?;
    let analyzer = state
        .analyzer
        .as_ref()
        .ok_or(XeniaError::Unavailable("Sentiment service not ready"))?;

    Ok(Json(analyzer.analyze_single(&query.text).await?))
}
