use thiserror::Error;

/// Errors that can occur during analysis operations.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Sentiment analysis error.
    #[error("Sentiment analysis error: {0}")]
    Sentiment(String),
    /// Model loading error.
    #[error("Model loading error: {0}")]
    ModelLoading(String),
    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Vectorization error.
    #[error("Vectorization error: {0}")]
    Vectorization(String),
    /// Tag classification error.
    #[error("Classification error: {0}")]
    Classification(String),
}

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
