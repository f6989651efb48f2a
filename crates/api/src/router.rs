//! Axum router configuration for the revtag HTTP API.

use crate::config::ApiConfig;
use crate::state::AppContext;
use axum::http::HeaderValue;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

/// Build the API router over a loaded application context.
pub fn build_router(config: &ApiConfig, ctx: Arc<AppContext>) -> Router {
    let mut router = Router::new()
        .merge(crate::predict::router())
        .merge(crate::analytics::router())
        .route("/health", get(health_check))
        .with_state(ctx);

    if config.enable_cors {
        router = router.layer(create_cors_layer(config));
    }

    router
}

/// Health check endpoint.
async fn health_check(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "labels": ctx.pipeline.label_count(),
    }))
}

/// Create CORS layer based on configuration.
fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT]);

    if config.cors_allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    // Credentials are only valid alongside an explicit origin list.
    cors.allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}
