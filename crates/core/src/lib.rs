//! Core types, errors, and configuration for revtag.
//!
//! This crate owns the feedback record model, the sentiment labels shared by
//! the pipeline and the analytics endpoint, and the append-only CSV store that
//! persists every prediction.

pub mod config;
pub mod constants;
pub mod error;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use config::RevtagConfig;
pub use error::{Error, Result};
pub use store::{FeedbackStore, StoreSnapshot};
pub use types::*;
