//! Text analysis for revtag: normalization, TF-IDF features, multi-label tag
//! classification and lexicon-based sentiment scoring.

#![deny(unsafe_code)]

/// Review text normalization.
pub mod nlp;

/// Tag classifier, label set and model artifact loading.
pub mod ml;

/// Feature extraction and vectorization.
pub mod features;

/// Lexicon-based sentiment scoring.
pub mod sentiment;

/// Error types for analysis operations.
pub mod error;

pub use error::{AnalysisError, AnalysisResult};
pub use features::{FeatureVector, TextVectorizer, TfIdfVectorizer};
pub use ml::{LabelBinarizer, LinearTagClassifier, ModelArtifacts, TagClassifier};
pub use nlp::TextNormalizer;
pub use sentiment::{LexiconSentimentScorer, SentimentScorer};
