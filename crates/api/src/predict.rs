//! `POST /predict`: tag a single review and log the result.

use crate::pipeline::Prediction;
use crate::state::AppContext;
use crate::{ApiError, ApiResult};
use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Prediction router.
pub fn router() -> Router<Arc<AppContext>> {
    Router::new().route("/predict", post(predict))
}

/// Extract the review text from a raw request body.
///
/// The body must be a JSON object whose `review` member is a string. An empty
/// string is accepted.
pub fn parse_review(body: &[u8]) -> ApiResult<String> {
    if body.is_empty() {
        return Err(ApiError::InvalidInput("request body is empty".to_string()));
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::InvalidInput(format!("body is not valid JSON: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| ApiError::InvalidInput("body is not a JSON object".to_string()))?;
    match object.get("review") {
        Some(Value::String(review)) => Ok(review.clone()),
        Some(Value::Null) | None => Err(ApiError::InvalidInput(
            "missing 'review' field".to_string(),
        )),
        Some(_) => Err(ApiError::InvalidInput(
            "'review' must be a string".to_string(),
        )),
    }
}

// Raw bytes rather than `Json<T>` so every malformed body maps to the same 400.
#[instrument(skip_all, fields(body_len = body.len()))]
async fn predict(
    State(ctx): State<Arc<AppContext>>,
    body: Bytes,
) -> ApiResult<Json<Prediction>> {
    let review = parse_review(&body)?;
    let prediction = tokio::task::spawn_blocking(move || ctx.pipeline.predict(&review))
        .await
        .map_err(|e| ApiError::Internal(format!("prediction task failed: {}", e)))??;
    Ok(Json(prediction))
}
