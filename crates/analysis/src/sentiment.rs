//! Lexicon-based polarity scoring.
//!
//! Every word found in the polarity lexicon contributes one assessment. An
//! intensifier directly before the word scales it, and a negator before that
//! flips and halves it. The polarity of a text is the mean of its assessments,
//! or `0.0` when no word carries sentiment.

use crate::error::{AnalysisError, AnalysisResult};
use once_cell::sync::Lazy;
use regex::Regex;
use revtag_core::Sentiment;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

/// Factor applied to a negated assessment.
const NEGATION_FACTOR: f64 = -0.5;

static DEFAULT_POLARITIES: &[(&str, f64)] = &[
    // positive
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("better", 0.5),
    ("brilliant", 0.9),
    ("comfortable", 0.4),
    ("cool", 0.35),
    ("delighted", 0.7),
    ("durable", 0.3),
    ("easy", 0.43),
    ("excellent", 1.0),
    ("fantastic", 0.4),
    ("fast", 0.2),
    ("fine", 0.42),
    ("friendly", 0.38),
    ("glad", 0.5),
    ("good", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("helpful", 0.4),
    ("impressive", 1.0),
    ("incredible", 0.9),
    ("love", 0.5),
    ("loved", 0.7),
    ("lovely", 0.5),
    ("nice", 0.6),
    ("ok", 0.5),
    ("okay", 0.5),
    ("outstanding", 0.5),
    ("perfect", 1.0),
    ("pleased", 0.5),
    ("quick", 0.33),
    ("recommend", 0.4),
    ("reliable", 0.3),
    ("satisfied", 0.5),
    ("smooth", 0.4),
    ("sturdy", 0.4),
    ("superb", 1.0),
    ("wonderful", 1.0),
    ("worth", 0.3),
    // negative
    ("annoying", -0.8),
    ("average", -0.15),
    ("awful", -1.0),
    ("bad", -0.7),
    ("broken", -0.4),
    ("damaged", -0.5),
    ("defective", -0.6),
    ("difficult", -0.5),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("expensive", -0.5),
    ("fake", -0.5),
    ("faulty", -0.5),
    ("flimsy", -0.5),
    ("fragile", -0.3),
    ("hate", -0.8),
    ("horrible", -1.0),
    ("junk", -0.4),
    ("late", -0.3),
    ("mediocre", -0.5),
    ("noisy", -0.3),
    ("overpriced", -0.6),
    ("poor", -0.4),
    ("rude", -0.3),
    ("slow", -0.3),
    ("terrible", -1.0),
    ("ugly", -0.7),
    ("uncomfortable", -0.5),
    ("unhappy", -0.6),
    ("unreliable", -0.5),
    ("useless", -0.5),
    ("waste", -0.2),
    ("worse", -0.4),
    ("worst", -1.0),
    ("wrong", -0.5),
];

static DEFAULT_INTENSIFIERS: &[(&str, f64)] = &[
    ("absolutely", 1.5),
    ("extremely", 1.5),
    ("highly", 1.4),
    ("incredibly", 1.4),
    ("quite", 1.1),
    ("really", 1.3),
    ("so", 1.3),
    ("super", 1.3),
    ("totally", 1.4),
    ("very", 1.3),
];

static NEGATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "not", "no", "never", "neither", "nor", "nothing", "cannot", "dont", "doesnt", "didnt",
        "isnt", "wasnt", "wont", "cant", "aint", "hardly",
    ]
    .into_iter()
    .collect()
});

/// Maps raw text to a polarity score in [-1, 1].
pub trait SentimentScorer: Send + Sync {
    /// Polarity of the text in [-1, 1].
    fn polarity(&self, text: &str) -> AnalysisResult<f64>;

    /// Polarity mapped to a sentiment label.
    fn classify(&self, text: &str) -> AnalysisResult<(f64, Sentiment)> {
        let polarity = self.polarity(text)?;
        Ok((polarity, Sentiment::from_polarity(polarity)))
    }
}

/// Word-list sentiment scorer with intensifier and negation handling.
#[derive(Debug, Clone)]
pub struct LexiconSentimentScorer {
    polarities: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    word_regex: Regex,
}

impl LexiconSentimentScorer {
    /// Create a scorer with the built-in English lexicon.
    pub fn new() -> AnalysisResult<Self> {
        Self::from_lexicon(
            DEFAULT_POLARITIES
                .iter()
                .map(|(word, polarity)| (word.to_string(), *polarity))
                .collect(),
        )
    }

    /// Create a scorer from an explicit polarity lexicon.
    pub fn from_lexicon(polarities: HashMap<String, f64>) -> AnalysisResult<Self> {
        for (word, polarity) in &polarities {
            validate_polarity(word, *polarity)?;
        }
        // Text is lowercased before lookup.
        let polarities = polarities
            .into_iter()
            .map(|(word, polarity)| (word.to_lowercase(), polarity))
            .collect();
        Ok(Self {
            polarities,
            intensifiers: DEFAULT_INTENSIFIERS
                .iter()
                .map(|(word, factor)| (word.to_string(), *factor))
                .collect(),
            word_regex: Regex::new(r"[\p{L}\p{N}']+")
                .map_err(|e| AnalysisError::Sentiment(e.to_string()))?,
        })
    }

    /// Built-in lexicon extended and overridden by a JSON file of `{"word": polarity}`.
    pub fn with_overrides(path: &Path) -> AnalysisResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::ModelLoading(format!(
                "failed to read lexicon {}: {}",
                path.display(),
                e
            ))
        })?;
        let overrides: HashMap<String, f64> = serde_json::from_str(&content).map_err(|e| {
            AnalysisError::ModelLoading(format!(
                "failed to parse lexicon {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut scorer = Self::new()?;
        let count = overrides.len();
        for (word, polarity) in overrides {
            validate_polarity(&word, polarity)?;
            scorer.polarities.insert(word.to_lowercase(), polarity);
        }
        info!("Loaded {} lexicon entries from {}", count, path.display());
        Ok(scorer)
    }

    /// Number of words carrying a polarity.
    pub fn len(&self) -> usize {
        self.polarities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polarities.is_empty()
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        let text = text.to_lowercase().replace('\u{2019}', "'");
        self.word_regex
            .find_iter(&text)
            .map(|m| m.as_str().trim_matches('\'').to_string())
            .filter(|token| !token.is_empty())
            .collect()
    }
}

impl SentimentScorer for LexiconSentimentScorer {
    fn polarity(&self, text: &str) -> AnalysisResult<f64> {
        let tokens = self.tokenize(text);
        let mut assessments = Vec::new();

        for (idx, token) in tokens.iter().enumerate() {
            let Some(&base) = self.polarities.get(token) else {
                continue;
            };

            let mut value = base;
            let mut cursor = idx;
            if cursor > 0 {
                if let Some(factor) = self.intensifiers.get(&tokens[cursor - 1]) {
                    value *= factor;
                    cursor -= 1;
                }
            }
            if cursor > 0 && is_negator(&tokens[cursor - 1]) {
                value *= NEGATION_FACTOR;
            }
            assessments.push(value.clamp(-1.0, 1.0));
        }

        if assessments.is_empty() {
            return Ok(0.0);
        }
        let mean = assessments.iter().sum::<f64>() / assessments.len() as f64;
        Ok(mean.clamp(-1.0, 1.0))
    }
}

fn is_negator(token: &str) -> bool {
    NEGATORS.contains(token) || token.ends_with("n't")
}

fn validate_polarity(word: &str, polarity: f64) -> AnalysisResult<()> {
    if !polarity.is_finite() || !(-1.0..=1.0).contains(&polarity) {
        return Err(AnalysisError::InvalidInput(format!(
            "polarity {} for '{}' is outside [-1, 1]",
            polarity, word
        )));
    }
    Ok(())
}
