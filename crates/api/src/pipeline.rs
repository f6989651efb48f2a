//! Prediction pipeline: normalize, vectorize, classify, score, log.

use crate::{ApiError, ApiResult};
use revtag_analysis::{ModelArtifacts, SentimentScorer, TextNormalizer};
use revtag_core::{tag_coverage_score, FeedbackRecord, FeedbackStore, Sentiment};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of tagging one review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Predicted aspect tags, in label-set order.
    pub tags: Vec<String>,
    /// Sentiment label of the raw review.
    pub sentiment: Sentiment,
    /// Share of the label set covered by `tags`, rounded to two decimals.
    pub score: f64,
    /// Raw polarity behind `sentiment`.
    #[serde(skip)]
    pub polarity: f64,
}

/// Runs one review through the model and records the result.
pub struct PredictionPipeline {
    normalizer: TextNormalizer,
    artifacts: ModelArtifacts,
    scorer: Arc<dyn SentimentScorer>,
    store: Arc<FeedbackStore>,
}

impl std::fmt::Debug for PredictionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionPipeline")
            .field("artifacts", &self.artifacts)
            .field("store", &self.store.path())
            .finish()
    }
}

impl PredictionPipeline {
    pub fn new(
        artifacts: ModelArtifacts,
        scorer: Arc<dyn SentimentScorer>,
        store: Arc<FeedbackStore>,
    ) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            artifacts,
            scorer,
            store,
        }
    }

    /// Size of the label set.
    pub fn label_count(&self) -> usize {
        self.artifacts.labels.len()
    }

    /// Label set in model order.
    pub fn labels(&self) -> &[String] {
        self.artifacts.labels.classes()
    }

    /// Tag a review and append the result to the feedback log.
    ///
    /// A failed append fails the whole prediction.
    pub fn predict(&self, review: &str) -> ApiResult<Prediction> {
        let prediction = self.predict_without_store(review)?;

        let record = FeedbackRecord::new(
            review,
            prediction.tags.clone(),
            prediction.sentiment,
            prediction.score,
        );
        self.store.append(&record).map_err(|e| {
            ApiError::Store(format!(
                "failed to append to {}: {}",
                self.store.path().display(),
                e
            ))
        })?;

        info!(
            tags = prediction.tags.len(),
            sentiment = %prediction.sentiment,
            score = prediction.score,
            "Recorded prediction"
        );
        Ok(prediction)
    }

    /// Tag a review without touching the feedback log.
    pub fn predict_without_store(&self, review: &str) -> ApiResult<Prediction> {
        let normalized = self.normalizer.normalize(review);
        debug!("Normalized review to {:?}", normalized);

        let tags = self.classify(&normalized)?;
        let (polarity, sentiment) = self
            .scorer
            .classify(review)
            .map_err(|e| ApiError::Classification(format!("sentiment scoring failed: {}", e)))?;
        let score = tag_coverage_score(tags.len(), self.label_count());

        Ok(Prediction {
            tags,
            sentiment,
            score,
            polarity,
        })
    }

    fn classify(&self, normalized: &str) -> ApiResult<Vec<String>> {
        if self.artifacts.labels.is_empty() {
            return Ok(Vec::new());
        }

        let features = self
            .artifacts
            .vectorizer
            .transform(normalized)
            .map_err(|e| ApiError::Classification(e.to_string()))?;
        if features.is_zero() {
            return Ok(Vec::new());
        }

        let bits = self
            .artifacts
            .classifier
            .predict(&features)
            .map_err(|e| ApiError::Classification(e.to_string()))?;
        self.artifacts
            .labels
            .inverse_transform(&bits)
            .map_err(|e| ApiError::Classification(e.to_string()))
    }
}
