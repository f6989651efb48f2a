//! Feature extraction: maps normalized review text to sparse TF-IDF vectors.

use crate::error::{AnalysisError, AnalysisResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Sparse feature vector as `(feature index, weight)` pairs sorted by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(usize, f64)>,
    dimension: usize,
}

impl FeatureVector {
    /// Build a vector from unsorted entries; duplicate indices are summed and
    /// zero weights dropped.
    pub fn from_entries(dimension: usize, entries: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
        for (idx, weight) in entries {
            *merged.entry(idx).or_insert(0.0) += weight;
        }
        Self {
            entries: merged.into_iter().filter(|(_, w)| *w != 0.0).collect(),
            dimension,
        }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Length of the dense representation.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// True when no feature is active.
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dot product with a dense weight row.
    pub fn dot(&self, weights: &[f64]) -> AnalysisResult<f64> {
        let mut sum = 0.0;
        for &(idx, value) in &self.entries {
            let weight = weights.get(idx).ok_or_else(|| {
                AnalysisError::Classification(format!(
                    "feature index {} outside weight row of length {}",
                    idx,
                    weights.len()
                ))
            })?;
            sum += weight * value;
        }
        Ok(sum)
    }
}

/// Maps normalized text to a feature vector.
pub trait TextVectorizer: Send + Sync {
    /// Transform one document.
    fn transform(&self, text: &str) -> AnalysisResult<FeatureVector>;

    /// Number of features produced.
    fn vocabulary_size(&self) -> usize;
}

/// Vector normalization applied after TF-IDF weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VectorNorm {
    #[default]
    L2,
    None,
}

/// On-disk form of a fitted TF-IDF vectorizer (`vectorizer.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfArtifact {
    /// Term -> feature index.
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per feature index.
    pub idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub norm: VectorNorm,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// TF-IDF vectorizer over word n-grams.
pub struct TfIdfVectorizer {
    artifact: TfIdfArtifact,
    token_regex: Regex,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.artifact.vocabulary.len())
            .field("ngram_range", &self.artifact.ngram_range)
            .field("sublinear_tf", &self.artifact.sublinear_tf)
            .field("norm", &self.artifact.norm)
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Build a vectorizer from a fitted artifact, validating its shape.
    pub fn from_artifact(artifact: TfIdfArtifact) -> AnalysisResult<Self> {
        let size = artifact.vocabulary.len();
        if artifact.idf.len() != size {
            return Err(AnalysisError::ModelLoading(format!(
                "vectorizer has {} vocabulary entries but {} idf weights",
                size,
                artifact.idf.len()
            )));
        }
        if let Some((term, idx)) = artifact.vocabulary.iter().find(|(_, idx)| **idx >= size) {
            return Err(AnalysisError::ModelLoading(format!(
                "vocabulary term '{}' maps to index {} outside 0..{}",
                term, idx, size
            )));
        }
        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(AnalysisError::ModelLoading(format!(
                "invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        Ok(Self {
            artifact,
            token_regex: Regex::new(r"\b\w\w+\b")
                .map_err(|e| AnalysisError::Vectorization(e.to_string()))?,
        })
    }

    /// Load `vectorizer.json`.
    pub fn load(path: &Path) -> AnalysisResult<Self> {
        let artifact: TfIdfArtifact = crate::ml::read_json_artifact(path)?;
        Self::from_artifact(artifact)
    }

    /// Word n-grams of the document, in order of appearance.
    fn terms(&self, text: &str) -> Vec<String> {
        let tokens: Vec<&str> = self.token_regex.find_iter(text).map(|m| m.as_str()).collect();
        let (min_n, max_n) = self.artifact.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n > tokens.len() {
                break;
            }
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }
}

impl TextVectorizer for TfIdfVectorizer {
    fn transform(&self, text: &str) -> AnalysisResult<FeatureVector> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in self.terms(text) {
            if let Some(&idx) = self.artifact.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut weights: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, count)| {
                let tf = if self.artifact.sublinear_tf {
                    1.0 + count.ln()
                } else {
                    count
                };
                (idx, tf * self.artifact.idf[idx])
            })
            .collect();

        if self.artifact.norm == VectorNorm::L2 {
            let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, w) in &mut weights {
                    *w /= norm;
                }
            }
        }

        Ok(FeatureVector::from_entries(self.vocabulary_size(), weights))
    }

    fn vocabulary_size(&self) -> usize {
        self.artifact.vocabulary.len()
    }
}
