//! Application constants and configuration defaults.

/// Polarity strictly above this value is labelled positive.
pub const POSITIVE_POLARITY_THRESHOLD: f64 = 0.2;

/// Polarity strictly below this value is labelled negative.
pub const NEGATIVE_POLARITY_THRESHOLD: f64 = -0.2;

/// Header row of the feedback CSV log.
pub const FEEDBACK_HEADER: [&str; 5] = ["timestamp", "feedback", "tags", "sentiment", "score"];

/// Separator used to join tags inside a single CSV field.
pub const TAG_SEPARATOR: &str = ", ";

/// Timestamp layout written for every feedback record (local time, microseconds).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Default HTTP server port.
pub const DEFAULT_HTTP_PORT: u16 = 5000;

/// Default location of the feedback log, relative to the working directory.
pub const DEFAULT_FEEDBACK_PATH: &str = "data/reviews.csv";

/// Default location of the model artifact directory.
pub const DEFAULT_ARTIFACT_DIR: &str = "models";

/// Maximum accepted request body size (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;
