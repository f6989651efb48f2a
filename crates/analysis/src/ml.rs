use crate::error::{AnalysisError, AnalysisResult};
use crate::features::{FeatureVector, TextVectorizer, TfIdfVectorizer};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// File name of the fitted vectorizer inside an artifact directory.
pub const VECTORIZER_FILE: &str = "vectorizer.json";
/// File name of the fitted classifier inside an artifact directory.
pub const CLASSIFIER_FILE: &str = "classifier.json";
/// File name of the label set inside an artifact directory.
pub const LABELS_FILE: &str = "labels.json";

/// Trait for multi-label tag classifiers.
pub trait TagClassifier: Send + Sync {
    /// Predict a 0/1 vector aligned to the label set.
    fn predict(&self, features: &FeatureVector) -> AnalysisResult<Vec<u8>>;

    /// Number of outputs (one per label).
    fn num_outputs(&self) -> usize;

    /// Number of input features expected.
    fn num_features(&self) -> usize;
}

/// Ordered label set, translating between tags and one-hot vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelBinarizer {
    classes: Vec<String>,
}

impl LabelBinarizer {
    /// Create a binarizer; labels must be unique.
    pub fn new(classes: Vec<String>) -> AnalysisResult<Self> {
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = classes.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(AnalysisError::ModelLoading(format!(
                "duplicate label '{}' in label set",
                dup
            )));
        }
        Ok(Self { classes })
    }

    /// Load `labels.json`.
    pub fn load(path: &Path) -> AnalysisResult<Self> {
        let raw: LabelBinarizer = read_json_artifact(path)?;
        Self::new(raw.classes)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Tags whose bit is set, in label-set order.
    pub fn inverse_transform(&self, bits: &[u8]) -> AnalysisResult<Vec<String>> {
        if bits.len() != self.classes.len() {
            return Err(AnalysisError::Classification(format!(
                "prediction has {} outputs but the label set has {} labels",
                bits.len(),
                self.classes.len()
            )));
        }
        Ok(self
            .classes
            .iter()
            .zip(bits)
            .filter(|(_, bit)| **bit == 1)
            .map(|(label, _)| label.clone())
            .collect())
    }
}

/// On-disk form of a one-vs-rest linear classifier (`classifier.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearArtifact {
    /// One weight row per label, each as long as the vocabulary.
    pub coefficients: Vec<Vec<f64>>,
    /// One bias per label.
    pub intercepts: Vec<f64>,
    /// Decision threshold on `w·x + b`.
    #[serde(default)]
    pub threshold: f64,
}

/// One-vs-rest linear classifier: label `i` is on when
/// `coefficients[i] · x + intercepts[i] > threshold`.
#[derive(Debug, Clone)]
pub struct LinearTagClassifier {
    artifact: LinearArtifact,
    num_features: usize,
}

impl LinearTagClassifier {
    /// Build from a fitted artifact, validating its shape.
    pub fn from_artifact(artifact: LinearArtifact) -> AnalysisResult<Self> {
        if artifact.coefficients.len() != artifact.intercepts.len() {
            return Err(AnalysisError::ModelLoading(format!(
                "classifier has {} coefficient rows but {} intercepts",
                artifact.coefficients.len(),
                artifact.intercepts.len()
            )));
        }
        let num_features = artifact.coefficients.first().map(Vec::len).unwrap_or(0);
        if let Some((row, weights)) = artifact
            .coefficients
            .iter()
            .enumerate()
            .find(|(_, weights)| weights.len() != num_features)
        {
            return Err(AnalysisError::ModelLoading(format!(
                "coefficient row {} has {} weights, expected {}",
                row,
                weights.len(),
                num_features
            )));
        }
        Ok(Self {
            artifact,
            num_features,
        })
    }

    /// Load `classifier.json`.
    pub fn load(path: &Path) -> AnalysisResult<Self> {
        Self::from_artifact(read_json_artifact(path)?)
    }
}

impl TagClassifier for LinearTagClassifier {
    fn predict(&self, features: &FeatureVector) -> AnalysisResult<Vec<u8>> {
        if features.dimension() != self.num_features {
            return Err(AnalysisError::Classification(format!(
                "feature vector has dimension {}, classifier expects {}",
                features.dimension(),
                self.num_features
            )));
        }
        self.artifact
            .coefficients
            .iter()
            .zip(&self.artifact.intercepts)
            .map(|(weights, intercept)| {
                let score = features.dot(weights)? + intercept;
                Ok(u8::from(score > self.artifact.threshold))
            })
            .collect()
    }

    fn num_outputs(&self) -> usize {
        self.artifact.coefficients.len()
    }

    fn num_features(&self) -> usize {
        self.num_features
    }
}

/// Loaded model artifacts: vectorizer, classifier and label set.
///
/// Built once at startup and shared read-only between requests.
#[derive(Clone)]
pub struct ModelArtifacts {
    pub vectorizer: Arc<dyn TextVectorizer>,
    pub classifier: Arc<dyn TagClassifier>,
    pub labels: LabelBinarizer,
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("vocabulary_size", &self.vectorizer.vocabulary_size())
            .field("num_outputs", &self.classifier.num_outputs())
            .field("labels", &self.labels.classes())
            .finish()
    }
}

impl ModelArtifacts {
    /// Assemble artifacts, checking that their shapes agree.
    pub fn new(
        vectorizer: Arc<dyn TextVectorizer>,
        classifier: Arc<dyn TagClassifier>,
        labels: LabelBinarizer,
    ) -> AnalysisResult<Self> {
        if classifier.num_outputs() != labels.len() {
            return Err(AnalysisError::ModelLoading(format!(
                "classifier predicts {} labels but the label set has {}",
                classifier.num_outputs(),
                labels.len()
            )));
        }
        if !labels.is_empty() && classifier.num_features() != vectorizer.vocabulary_size() {
            return Err(AnalysisError::ModelLoading(format!(
                "classifier expects {} features but the vectorizer produces {}",
                classifier.num_features(),
                vectorizer.vocabulary_size()
            )));
        }
        Ok(Self {
            vectorizer,
            classifier,
            labels,
        })
    }

    /// Load `vectorizer.json`, `classifier.json` and `labels.json` from a directory.
    pub fn load_dir(dir: &Path) -> AnalysisResult<Self> {
        let vectorizer = TfIdfVectorizer::load(&dir.join(VECTORIZER_FILE))?;
        let classifier = LinearTagClassifier::load(&dir.join(CLASSIFIER_FILE))?;
        let labels = LabelBinarizer::load(&dir.join(LABELS_FILE))?;

        let artifacts = Self::new(Arc::new(vectorizer), Arc::new(classifier), labels)?;
        info!(
            "Loaded model artifacts from {} ({} labels, {} features)",
            dir.display(),
            artifacts.labels.len(),
            artifacts.vectorizer.vocabulary_size()
        );
        Ok(artifacts)
    }
}

/// Read and deserialize one JSON artifact file.
pub(crate) fn read_json_artifact<T: DeserializeOwned>(path: &Path) -> AnalysisResult<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AnalysisError::ModelLoading(format!("failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        AnalysisError::ModelLoading(format!("failed to parse {}: {}", path.display(), e))
    })
}
