//! Feedback analytics: tag and sentiment frequencies over the whole log.

use crate::state::AppContext;
use crate::{ApiError, ApiResult};
use axum::{extract::State, routing::get, Json, Router};
use revtag_core::{Error as CoreError, FeedbackStore};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Analytics router.
pub fn router() -> Router<Arc<AppContext>> {
    Router::new().route("/analytics", get(get_analytics))
}

/// Aggregate counts over every valid record in the feedback log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub tag_counts: BTreeMap<String, u64>,
    pub sentiment_counts: BTreeMap<String, u64>,
    /// Rows in the log that could not be parsed.
    #[serde(skip_serializing_if = "is_zero")]
    pub skipped_rows: usize,
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

impl AnalyticsReport {
    /// Number of records the report was computed from.
    pub fn total_records(&self) -> u64 {
        self.sentiment_counts.values().sum()
    }
}

/// Computes [`AnalyticsReport`]s from the feedback log.
#[derive(Debug, Clone)]
pub struct AnalyticsAggregator {
    store: Arc<FeedbackStore>,
}

impl AnalyticsAggregator {
    pub fn new(store: Arc<FeedbackStore>) -> Self {
        Self { store }
    }

    /// Read the whole log and count tags and sentiments.
    ///
    /// Fails with [`ApiError::NoData`] when the log is missing or holds no
    /// valid record.
    pub fn aggregate(&self) -> ApiResult<AnalyticsReport> {
        let snapshot = match self.store.read_all() {
            Ok(snapshot) => snapshot,
            Err(CoreError::StoreUnavailable(msg)) => return Err(ApiError::NoData(msg)),
            Err(e) => return Err(ApiError::Store(e.to_string())),
        };
        if snapshot.is_empty() {
            return Err(ApiError::NoData(format!(
                "no valid records in {}",
                self.store.path().display()
            )));
        }
        if snapshot.skipped_rows > 0 {
            warn!(
                "Analytics ignored {} malformed rows in {}",
                snapshot.skipped_rows,
                self.store.path().display()
            );
        }

        let mut report = AnalyticsReport {
            skipped_rows: snapshot.skipped_rows,
            ..Default::default()
        };
        for record in &snapshot.records {
            for tag in &record.tags {
                *report.tag_counts.entry(tag.clone()).or_insert(0) += 1;
            }
            *report
                .sentiment_counts
                .entry(record.sentiment.as_str().to_string())
                .or_insert(0) += 1;
        }
        debug!(
            "Aggregated {} records into {} tags",
            snapshot.records.len(),
            report.tag_counts.len()
        );
        Ok(report)
    }
}

#[instrument(skip_all)]
async fn get_analytics(State(ctx): State<Arc<AppContext>>) -> ApiResult<Json<AnalyticsReport>> {
    let report = tokio::task::spawn_blocking(move || ctx.analytics.aggregate())
        .await
        .map_err(|e| ApiError::Internal(format!("analytics task failed: {}", e)))??;
    Ok(Json(report))
}
