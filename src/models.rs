//! Data models for the sentiment service.
//!
//! This module contains the request/response records exchanged over HTTP
//! and the per-comment classification types produced by the analyzer.

use crate::error::{Result, XeniaError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest accepted `max_comments`.
pub const MIN_COMMENTS: usize = 10;
/// Largest accepted `max_comments`.
pub const MAX_COMMENTS: usize = 500;

/// Sentiment label assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    /// Reserved; the default binary model never produces it.
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "POSITIVE"),
            SentimentLabel::Negative => write!(f, "NEGATIVE"),
            SentimentLabel::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

impl SentimentLabel {
    /// Map a raw model label onto the closed label set.
    pub fn from_model_label(label: &str) -> Result<Self> {
        match label.trim().to_lowercase().as_str() {
            "positive" | "pos" | "label_1" => Ok(SentimentLabel::Positive),
            "negative" | "neg" | "label_0" => Ok(SentimentLabel::Negative),
            "neutral" | "neu" => Ok(SentimentLabel::Neutral),
            other => Err(XeniaError::Scoring(format!(
                "unexpected model label '{}'",
                other
            ))),
        }
    }

    /// Returns an emoji representation of the label.
    pub fn emoji(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "😊",
            SentimentLabel::Negative => "😠",
            SentimentLabel::Neutral => "😐",
        }
    }
}

/// A comment together with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedComment {
    /// Full original text (never the truncated scoring input).
    pub text: String,
    pub sentiment: SentimentLabel,
    /// Classifier confidence in [0, 1].
    pub confidence: f32,
}

/// Number of comments per label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    #[serde(default)]
    pub neutral: usize,
}

impl SentimentDistribution {
    /// Count comments per label.
    pub fn from_comments(comments: &[ClassifiedComment]) -> Self {
        let mut dist = Self::default();

        for comment in comments {
            match comment.sentiment {
                SentimentLabel::Positive => dist.positive += 1,
                SentimentLabel::Negative => dist.negative += 1,
                SentimentLabel::Neutral => dist.neutral += 1,
            }
        }

        dist
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// Aggregated sentiment summary of one comment list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_comments: usize,
    pub sentiment_distribution: SentimentDistribution,
    pub top_positive_comments: Vec<ClassifiedComment>,
    pub top_negative_comments: Vec<ClassifiedComment>,
    pub processing_time_seconds: f64,
}

impl AnalysisResult {
    /// The zero-valued result returned for an empty comment list.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Basic video information, looked up on a best-effort basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    pub channel: String,
    pub views: String,
    pub likes: String,
    pub comments: String,
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// YouTube video URL.
    pub video_url: String,
    /// Maximum comments to analyze.
    #[serde(default = "default_max_comments")]
    pub max_comments: usize,
}

fn default_max_comments() -> usize {
    100
}

impl AnalysisRequest {
    /// Validate request parameters that do not need the comment source.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_COMMENTS..=MAX_COMMENTS).contains(&self.max_comments) {
            return Err(XeniaError::InvalidInput(format!(
                "max_comments must be between {} and {}",
                MIN_COMMENTS, MAX_COMMENTS
            )));
        }
        Ok(())
    }
}

/// Response of `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub video_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoInfo>,
    pub total_comments: usize,
    pub sentiment_distribution: SentimentDistribution,
    pub top_positive_comments: Vec<ClassifiedComment>,
    pub top_negative_comments: Vec<ClassifiedComment>,
    /// Whole-request wall time in seconds.
    pub processing_time_seconds: f64,
}

impl AnalysisResponse {
    pub fn new(
        video_id: String,
        video: Option<VideoInfo>,
        result: AnalysisResult,
        elapsed_seconds: f64,
    ) -> Self {
        Self {
            video_id,
            video,
            total_comments: result.total_comments,
            sentiment_distribution: result.sentiment_distribution,
            top_positive_comments: result.top_positive_comments,
            top_negative_comments: result.top_negative_comments,
            processing_time_seconds: round_seconds(elapsed_seconds),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Metadata about a one-shot analysis report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// URL the analysis was requested for.
    pub video_url: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Name of the sentiment model used.
    pub model_used: String,
    /// Requested comment limit.
    pub max_comments: usize,
}

/// A one-shot analysis written to disk by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub analysis: AnalysisResponse,
}

/// Round a duration to two decimals for reporting.
pub fn round_seconds(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}
