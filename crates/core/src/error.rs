//! Error types for revtag core functionality.

use thiserror::Error;

/// Main error type for revtag core.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Data parsing error: {0}")]
    Parse(String),
    /// The backing file of the feedback store does not exist.
    #[error("Feedback store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Feedback store error: {0}")]
    Store(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for revtag core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Store(err.to_string())
    }
}
