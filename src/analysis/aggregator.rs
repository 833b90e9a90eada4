//! Sentiment aggregation.
//!
//! This module scores comment lists through an injected [`Scorer`] and
//! reduces the scores to a label distribution plus the most confident
//! examples per label.

use crate::config::{SentimentConfig, MAX_INPUT_CHARS, MAX_TOP_K};
use crate::error::{Result, XeniaError};
use crate::models::{
    round_seconds, AnalysisResult, ClassifiedComment, SentimentDistribution, SentimentLabel,
};
use crate::scoring::Scorer;
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Scores comments and aggregates the results.
///
/// Holds no per-request state; one instance is shared by all requests.
pub struct SentimentAnalyzer {
    scorer: Arc<dyn Scorer>,
    batch_size: usize,
    max_input_chars: usize,
    top_k: usize,
}

impl SentimentAnalyzer {
    pub fn new(scorer: Arc<dyn Scorer>, config: &SentimentConfig) -> Self {
        Self {
            scorer,
            batch_size: config.batch_size.max(1),
            max_input_chars: config.max_input_chars.clamp(1, MAX_INPUT_CHARS),
            top_k: config.top_k.min(MAX_TOP_K),
        }
    }

    pub fn model_name(&self) -> &str {
        self.scorer.model_name()
    }

    /// Classify every comment and summarize the results.
    ///
    /// An empty list yields [`AnalysisResult::empty`] without calling the
    /// scorer. Scorer failures abort the whole analysis.
    pub async fn analyze(&self, comments: &[String]) -> Result<AnalysisResult> {
        let start_time = Instant::now();

        if comments.is_empty() {
            return Ok(AnalysisResult::empty());
        }

        let inputs: Vec<&str> = comments
            .iter()
            .map(|c| truncate_chars(c, self.max_input_chars))
            .collect();

        let mut scores = Vec::with_capacity(inputs.len());
        for (i, batch) in inputs.chunks(self.batch_size).enumerate() {
            debug!("Scoring batch {} ({} comments)", i + 1, batch.len());
            let batch_scores = self.scorer.score(batch).await?;
            if batch_scores.len() != batch.len() {
                return Err(XeniaError::Scoring(format!(
                    "scorer returned {} results for {} inputs",
                    batch_scores.len(),
                    batch.len()
                )));
            }
            scores.extend(batch_scores);
        }

        let classified: Vec<ClassifiedComment> = comments
            .iter()
            .zip(scores)
            .map(|(text, score)| ClassifiedComment {
                text: text.clone(),
                sentiment: score.label,
                confidence: score.confidence,
            })
            .collect();

        let distribution = SentimentDistribution::from_comments(&classified);
        let elapsed = start_time.elapsed().as_secs_f64();

        info!(
            "Classified {} comments: {} positive, {} negative",
            classified.len(),
            distribution.positive,
            distribution.negative
        );

        Ok(AnalysisResult {
            total_comments: classified.len(),
            sentiment_distribution: distribution,
            top_positive_comments: top_by_confidence(
                &classified,
                SentimentLabel::Positive,
                self.top_k,
            ),
            top_negative_comments: top_by_confidence(
                &classified,
                SentimentLabel::Negative,
                self.top_k,
            ),
            processing_time_seconds: round_seconds(elapsed),
        })
    }

    /// Classify a single comment; the returned text is the full original.
    pub async fn analyze_single(&self, text: &str) -> Result<ClassifiedComment> {
        let input = truncate_chars(text, self.max_input_chars);
        let score = self
            .scorer
            .score(&[input])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| XeniaError::Scoring("scorer returned no result".to_string()))?;

        Ok(ClassifiedComment {
            text: text.to_string(),
            sentiment: score.label,
            confidence: score.confidence,
        })
    }
}

/// Borrow at most `max_chars` characters from the start of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Comments carrying `label`, in original order.
pub fn group_by_label(
    comments: &[ClassifiedComment],
    label: SentimentLabel,
) -> Vec<ClassifiedComment> {
    comments
        .iter()
        .filter(|c| c.sentiment == label)
        .cloned()
        .collect()
}

/// Sort by confidence, highest first. Stable: equal confidences keep their
/// original relative order.
pub fn sort_by_confidence(comments: &mut [ClassifiedComment]) {
    comments.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });
}

/// The `k` most confident comments carrying `label`.
pub fn top_by_confidence(
    comments: &[ClassifiedComment],
    label: SentimentLabel,
    k: usize,
) -> Vec<ClassifiedComment> {
    let mut group = group_by_label(comments, label);
    sort_by_confidence(&mut group);
    group.truncate(k);
    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Score;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Deterministic scorer: texts mentioning "terrible" or "bad" are
    /// negative; confidence is read from a trailing `#NN` tag (percent) when
    /// present.
    #[derive(Default)]
    struct StubScorer {
        calls: Mutex<Vec<Vec<String>>>,
        drop_last: bool,
    }

    impl StubScorer {
        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn stub_score(text: &str) -> Score {
        let lower = text.to_lowercase();
        let label = if lower.contains("terrible") || lower.contains("bad") {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Positive
        };
        let confidence = text
            .rsplit_once('#')
            .and_then(|(_, pct)| pct.parse::<f32>().ok())
            .map(|pct| pct / 100.0)
            .unwrap_or(0.9);
        Score { label, confidence }
    }

    #[async_trait]
    impl Scorer for StubScorer {
        fn model_name(&self) -> &str {
            "stub"
        }

        async fn score(&self, texts: &[&str]) -> Result<Vec<Score>> {
            self.calls
                .lock()
                .unwrap()
                .push(texts.iter().map(|t| t.to_string()).collect());
            let mut scores: Vec<Score> = texts.iter().map(|t| stub_score(t)).collect();
            if self.drop_last {
                scores.pop();
            }
            Ok(scores)
        }
    }

    struct FailingScorer;

    #[async_trait]
    impl Scorer for FailingScorer {
        fn model_name(&self) -> &str {
            "failing"
        }

        async fn score(&self, _texts: &[&str]) -> Result<Vec<Score>> {
            Err(XeniaError::Scoring("model crashed".to_string()))
        }
    }

    fn analyzer(scorer: Arc<dyn Scorer>, batch_size: usize) -> SentimentAnalyzer {
        let config = SentimentConfig {
            batch_size,
            ..SentimentConfig::default()
        };
        SentimentAnalyzer::new(scorer, &config)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_input_skips_scorer() {
        let stub = Arc::new(StubScorer::default());
        let result = tokio_test::block_on(analyzer(stub.clone(), 8).analyze(&[])).unwrap();

        assert_eq!(result, AnalysisResult::empty());
        assert_eq!(result.processing_time_seconds, 0.0);
        assert!(stub.calls().is_empty());
    }

    #[tokio::test]
    async fn test_positive_and_negative_scenario() {
        let stub = Arc::new(StubScorer::default());
        let comments = strings(&["great video!!", "this was terrible and boring"]);

        let result = analyzer(stub, 8).analyze(&comments).await.unwrap();

        assert_eq!(result.total_comments, 2);
        assert_eq!(result.sentiment_distribution.positive, 1);
        assert_eq!(result.sentiment_distribution.negative, 1);
        assert_eq!(result.sentiment_distribution.neutral, 0);
        assert_eq!(result.top_positive_comments[0].text, "great video!!");
        assert_eq!(
            result.top_negative_comments[0].text,
            "this was terrible and boring"
        );
    }

    #[tokio::test]
    async fn test_long_comment_truncated_for_scoring_only() {
        let stub = Arc::new(StubScorer::default());
        let long = "a".repeat(1000);

        let result = analyzer(stub.clone(), 8)
            .analyze(&[long.clone()])
            .await
            .unwrap();

        assert_eq!(stub.calls()[0][0].chars().count(), 500);
        assert_eq!(result.top_positive_comments[0].text, long);
    }

    #[tokio::test]
    async fn test_batches_preserve_order() {
        let stub = Arc::new(StubScorer::default());
        let comments: Vec<String> = (0..20)
            .map(|i| {
                if i % 3 == 0 {
                    format!("bad comment number {} #{}", i, 50 + i)
                } else {
                    format!("fine comment number {} #{}", i, 50 + i)
                }
            })
            .collect();

        let result = analyzer(stub.clone(), 8).analyze(&comments).await.unwrap();

        let calls = stub.calls();
        assert_eq!(
            calls.iter().map(|c| c.len()).collect::<Vec<_>>(),
            vec![8, 8, 4]
        );
        assert_eq!(calls.concat(), comments);
        assert_eq!(result.sentiment_distribution.negative, 7);
        assert_eq!(result.sentiment_distribution.positive, 13);
        // Highest confidence negative is comment 18 (#68).
        assert_eq!(result.top_negative_comments[0].text, comments[18]);
    }

    #[tokio::test]
    async fn test_top_lists_bounded_sorted_and_counted() {
        let stub = Arc::new(StubScorer::default());
        let comments: Vec<String> = (0..37)
            .map(|i| {
                let pct = (i * 37) % 100;
                if i % 2 == 0 {
                    format!("bad take {} #{}", i, pct)
                } else {
                    format!("lovely {} #{}", i, pct)
                }
            })
            .collect();

        let result = analyzer(stub, 5).analyze(&comments).await.unwrap();

        assert!(result.top_positive_comments.len() <= 5);
        assert!(result.top_negative_comments.len() <= 5);
        assert_eq!(
            result.sentiment_distribution.positive + result.sentiment_distribution.negative,
            result.total_comments
        );
        for list in [&result.top_positive_comments, &result.top_negative_comments] {
            assert!(list.windows(2).all(|w| w[0].confidence >= w[1].confidence));
        }
    }

    #[tokio::test]
    async fn test_oversized_top_k_is_capped() {
        let config = SentimentConfig {
            top_k: 50,
            ..SentimentConfig::default()
        };
        let analyzer = SentimentAnalyzer::new(Arc::new(StubScorer::default()), &config);
        let comments: Vec<String> = (0..20).map(|i| format!("lovely clip {} #90", i)).collect();

        let result = analyzer.analyze(&comments).await.unwrap();

        assert_eq!(result.sentiment_distribution.positive, 20);
        assert_eq!(result.top_positive_comments.len(), MAX_TOP_K);
    }

    #[tokio::test]
    async fn test_equal_confidence_keeps_original_order() {
        let stub = Arc::new(StubScorer::default());
        let comments = strings(&[
            "first nice one #80",
            "second nice one #95",
            "third nice one #80",
            "fourth nice one #80",
        ]);

        let result = analyzer(stub, 8).analyze(&comments).await.unwrap();
        let texts: Vec<&str> = result
            .top_positive_comments
            .iter()
            .map(|c| c.text.as_str())
            .collect();

        assert_eq!(
            texts,
            vec![
                "second nice one #95",
                "first nice one #80",
                "third nice one #80",
                "fourth nice one #80"
            ]
        );
    }

    #[tokio::test]
    async fn test_scorer_failure_propagates() {
        let err = analyzer(Arc::new(FailingScorer), 8)
            .analyze(&strings(&["great video!!"]))
            .await
            .unwrap_err();
        assert!(matches!(err, XeniaError::Scoring(_)));
    }

    #[tokio::test]
    async fn test_short_scorer_reply_is_an_error() {
        let stub = Arc::new(StubScorer {
            drop_last: true,
            ..StubScorer::default()
        });
        let err = analyzer(stub, 8)
            .analyze(&strings(&["great video!!", "another great one"]))
            .await
            .unwrap_err();
        assert!(matches!(err, XeniaError::Scoring(_)));
    }

    #[tokio::test]
    async fn test_analyze_single() {
        let stub = Arc::new(StubScorer::default());
        let long = format!("terrible {}", "x".repeat(700));

        let comment = analyzer(stub.clone(), 8).analyze_single(&long).await.unwrap();

        assert_eq!(comment.sentiment, SentimentLabel::Negative);
        assert_eq!(comment.text, long);
        assert_eq!(stub.calls()[0][0].chars().count(), 500);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("", 5), "");
    }
}
