//! Sentiment scoring capability.
//!
//! The analyzer only sees the [`Scorer`] trait; the HuggingFace client is the
//! production implementation and tests inject deterministic stubs.

pub mod huggingface;

pub use huggingface::HuggingFaceScorer;

use crate::error::Result;
use crate::models::SentimentLabel;
use async_trait::async_trait;

/// Label and confidence for one scored text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub label: SentimentLabel,
    pub confidence: f32,
}

/// A pre-trained sentiment classifier.
///
/// Implementations must return exactly one score per input text, in input
/// order, and must be safe to call concurrently.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Name of the underlying model, for logs and reports.
    fn model_name(&self) -> &str;

    /// Score a batch of texts.
    async fn score(&self, texts: &[&str]) -> Result<Vec<Score>>;
}
