//! Error types shared by the comment source, the scorer, and the HTTP layer.

use axum::http::StatusCode;

/// Errors produced while serving an analysis request.
#[derive(Debug, thiserror::Error)]
pub enum XeniaError {
    /// Malformed identifier or out-of-range request parameter.
    #[error("{0}")]
    InvalidInput(String),

    /// Nothing to analyze: unknown video, comments disabled, or no comments.
    #[error("{0}")]
    NotFound(String),

    #[error("YouTube API quota exceeded or comments disabled")]
    QuotaExceeded,

    /// Provider failure (network, 5xx, malformed body).
    #[error("YouTube API error: {0}")]
    Upstream(String),

    /// A service was never constructed (missing API key at startup).
    #[error("{0}")]
    Unavailable(&'static str),

    /// The sentiment scorer failed; fatal to the request.
    #[error("sentiment scoring failed: {0}")]
    Scoring(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl XeniaError {
    /// HTTP status this error is surfaced with.
    pub fn status(&self) -> StatusCode {
        match self {
            XeniaError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            XeniaError::NotFound(_) => StatusCode::NOT_FOUND,
            XeniaError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            XeniaError::QuotaExceeded
            | XeniaError::Upstream(_)
            | XeniaError::Scoring(_)
            | XeniaError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result alias for service operations.
pub type Result<T> = std::result::Result<T, XeniaError>;
