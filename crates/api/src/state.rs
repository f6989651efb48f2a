//! Shared application state handed to every handler.

use crate::analytics::AnalyticsAggregator;
use crate::pipeline::PredictionPipeline;
use crate::ApiResult;
use revtag_analysis::{LexiconSentimentScorer, ModelArtifacts, SentimentScorer};
use revtag_core::{FeedbackStore, RevtagConfig};
use std::sync::Arc;
use tracing::info;

/// Immutable state loaded once at startup.
#[derive(Debug)]
pub struct AppContext {
    pub pipeline: PredictionPipeline,
    pub analytics: AnalyticsAggregator,
}

impl AppContext {
    pub fn new(
        artifacts: ModelArtifacts,
        scorer: Arc<dyn SentimentScorer>,
        store: Arc<FeedbackStore>,
    ) -> Self {
        Self {
            pipeline: PredictionPipeline::new(artifacts, scorer, store.clone()),
            analytics: AnalyticsAggregator::new(store),
        }
    }

    /// Load model artifacts and lexicon, and initialize the feedback log.
    pub fn from_config(config: &RevtagConfig) -> ApiResult<Self> {
        let (artifacts, scorer) = load_model(config)?;
        let store = FeedbackStore::open(&config.storage.feedback_path)?;
        info!("Feedback log: {}", store.path().display());

        Ok(Self::new(artifacts, Arc::new(scorer), Arc::new(store)))
    }
}

/// Load the tagging model and the sentiment lexicon named by the configuration.
pub fn load_model(config: &RevtagConfig) -> ApiResult<(ModelArtifacts, LexiconSentimentScorer)> {
    let artifacts = ModelArtifacts::load_dir(&config.model.artifact_dir)?;
    let scorer = match &config.model.lexicon_path {
        Some(path) => LexiconSentimentScorer::with_overrides(path)?,
        None => LexiconSentimentScorer::new()?,
    };
    info!("Sentiment lexicon: {} entries", scorer.len());
    Ok((artifacts, scorer))
}
