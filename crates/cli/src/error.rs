//! Error types for CLI operations.

use thiserror::Error;

/// Main error type for CLI operations.
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// API server or pipeline error.
    #[error(transparent)]
    Api(#[from] revtag_api::ApiError),

    /// Model or lexicon error.
    #[error("Analysis error: {0}")]
    Analysis(#[from] revtag_analysis::AnalysisError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output serialization error.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<revtag_core::Error> for CliError {
    fn from(err: revtag_core::Error) -> Self {
        match err {
            revtag_core::Error::Config(msg) | revtag_core::Error::Parse(msg) => {
                CliError::Config(msg)
            }
            other => CliError::Api(other.into()),
        }
    }
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
