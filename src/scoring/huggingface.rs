//! HuggingFace Inference API client for text classification.
//!
//! See: <https://huggingface.co/docs/api-inference/index>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Score, Scorer};
use crate::config::SentimentConfig;
use crate::error::{Result, XeniaError};
use crate::models::SentimentLabel;

/// Text-classification scorer backed by a hosted HuggingFace model.
#[derive(Clone)]
pub struct HuggingFaceScorer {
    api_key: String,
    http: Client,
    base_url: String,
    model: String,
}

impl HuggingFaceScorer {
    /// Create a scorer from the `[sentiment]` config section.
    pub fn new(api_key: impl Into<String>, config: &SentimentConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| XeniaError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Check response status and map to a scoring error.
    fn check_status(&self, response: &reqwest::Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let message = match status.as_u16() {
            401 => "authentication failed".to_string(),
            404 => format!("model not found: {}", self.model),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                format!("rate limited, retry after {}s", retry_after)
            }
            503 => "model is loading, please retry".to_string(),
            _ => format!("HuggingFace API error: {}", status),
        };

        Err(XeniaError::Scoring(message))
    }
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a [&'a str],
    options: ClassifyOptions,
}

#[derive(Serialize)]
struct ClassifyOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

/// Batched inputs come back nested (one list per input); a single input may
/// come back flat.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassifyResponse {
    fn into_rows(self) -> Vec<Vec<LabelScore>> {
        match self {
            ClassifyResponse::Nested(rows) => rows,
            ClassifyResponse::Flat(row) => vec![row],
        }
    }
}

fn best_score(row: Vec<LabelScore>) -> Result<Score> {
    let best = row
        .into_iter()
        .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or_else(|| XeniaError::Scoring("empty classification".to_string()))?;

    Ok(Score {
        label: SentimentLabel::from_model_label(&best.label)?,
        confidence: best.score,
    })
}

#[async_trait]
impl Scorer for HuggingFaceScorer {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn score(&self, texts: &[&str]) -> Result<Vec<Score>> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        debug!("Scoring {} texts with {}", texts.len(), self.model);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&ClassifyRequest {
                inputs: texts,
                options: ClassifyOptions {
                    wait_for_model: true,
                },
            })
            .send()
            .await
            .map_err(|e| XeniaError::Scoring(e.to_string()))?;

        self.check_status(&response)?;

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| XeniaError::Scoring(format!("malformed response: {}", e)))?;

        body.into_rows().into_iter().map(best_score).collect()
    }
}
