//! Shared data model for predictions and the feedback log.

use crate::constants::{
    NEGATIVE_POLARITY_THRESHOLD, POSITIVE_POLARITY_THRESHOLD, TIMESTAMP_FORMAT,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentiment label derived from a polarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Map a polarity in [-1, 1] to a label.
    ///
    /// Both thresholds are strict, so exactly `0.2` and `-0.2` are neutral.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > POSITIVE_POLARITY_THRESHOLD {
            Sentiment::Positive
        } else if polarity < NEGATIVE_POLARITY_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    /// Lowercase label as written to the log and the JSON responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(Error::Parse(format!("unknown sentiment label '{}'", other))),
        }
    }
}

/// One persisted prediction.
///
/// Records are built once per prediction and only ever appended to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Local ISO-8601 timestamp with microseconds.
    pub timestamp: String,
    /// The review exactly as submitted.
    pub raw_text: String,
    /// Predicted tags in label-set order.
    pub tags: Vec<String>,
    pub sentiment: Sentiment,
    /// Fraction of the label set that was predicted, rounded to 2 decimals.
    pub score: f64,
}

impl FeedbackRecord {
    /// Build a record stamped with the current local time.
    pub fn new(
        raw_text: impl Into<String>,
        tags: Vec<String>,
        sentiment: Sentiment,
        score: f64,
    ) -> Self {
        Self {
            timestamp: current_timestamp(),
            raw_text: raw_text.into(),
            tags,
            sentiment,
            score,
        }
    }
}

/// Current local time in the feedback log layout.
pub fn current_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Check that a stored timestamp is a valid ISO-8601 local date-time.
pub fn validate_timestamp(value: &str) -> Result<()> {
    chrono::NaiveDateTime::from_str(value.trim())
        .map(|_| ())
        .map_err(|e| Error::Validation(format!("invalid timestamp '{}': {}", value, e)))
}

/// Round to two decimals, half away from zero.
pub fn round_score(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Share of the label set covered by the predicted tags.
///
/// Returns `0.0` for an empty label set.
pub fn tag_coverage_score(tag_count: usize, label_count: usize) -> f64 {
    if label_count == 0 {
        return 0.0;
    }
    round_score(tag_count as f64 / label_count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polarity_thresholds_are_strict() {
        assert_eq!(Sentiment::from_polarity(0.25), Sentiment::Positive);
        assert_eq!(Sentiment::from_polarity(-0.5), Sentiment::Negative);
        assert_eq!(Sentiment::from_polarity(0.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(0.2), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(-0.2), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(1.0), Sentiment::Positive);
        assert_eq!(Sentiment::from_polarity(-1.0), Sentiment::Negative);
    }

    #[test]
    fn sentiment_labels_parse_and_serialize_lowercase() {
        assert_eq!("positive".parse::<Sentiment>().ok(), Some(Sentiment::Positive));
        assert_eq!(" neutral ".parse::<Sentiment>().ok(), Some(Sentiment::Neutral));
        assert!("Happy".parse::<Sentiment>().is_err());
        assert_eq!(
            serde_json::to_string(&Sentiment::Negative).unwrap(),
            "\"negative\""
        );
    }

    #[test]
    fn coverage_score_rounds_to_two_decimals() {
        assert_eq!(tag_coverage_score(0, 5), 0.0);
        assert_eq!(tag_coverage_score(5, 5), 1.0);
        assert_eq!(tag_coverage_score(1, 3), 0.33);
        assert_eq!(tag_coverage_score(2, 3), 0.67);
        assert_eq!(tag_coverage_score(3, 0), 0.0);
    }

    #[test]
    fn generated_timestamps_validate() {
        let record = FeedbackRecord::new("ok", Vec::new(), Sentiment::Neutral, 0.0);
        assert!(validate_timestamp(&record.timestamp).is_ok());
        assert!(validate_timestamp("2024-05-01T10:11:12.123456").is_ok());
        assert!(validate_timestamp("yesterday").is_err());
    }
}
