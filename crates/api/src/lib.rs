//! HTTP API for revtag: review tag prediction and feedback analytics.
//!
//! Model artifacts and the feedback log are loaded once into an
//! [`AppContext`] and shared with every handler through axum state.

#![deny(unsafe_code)]

pub mod analytics;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod predict;
pub mod router;
pub mod server;
pub mod state;

pub use analytics::{AnalyticsAggregator, AnalyticsReport};
pub use config::ApiConfig;
pub use error::*;
pub use pipeline::{Prediction, PredictionPipeline};
pub use router::build_router;
pub use server::{start_server, ApiServer};
pub use state::{load_model, AppContext};
