//! Classifier model artifact.
//!
//! A trained k-NN activity model serialized to JSON by the training
//! pipeline, together with its evaluation metrics and provenance metadata.
//! The core only consumes the artifact; training it is out of scope.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, Result};

/// Number of features the activity model is trained on: dominant frequency,
/// intensity, periodicity.
pub const FEATURE_DIM: usize = 3;

/// Complete trained-model payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub model: KnnModel,
    pub metrics: ModelMetrics,
    pub metadata: ModelMetadata,
}

/// k-nearest-neighbors model: the training set is the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnModel {
    /// Classifier family name, e.g. `"knn"`.
    pub classifier: String,
    /// Neighbors consulted per prediction.
    pub k: usize,
    /// Training feature rows, each of [`FEATURE_DIM`] values.
    pub features: Vec<Vec<f64>>,
    /// Class index per training row, indexing into `label_names`.
    pub labels: Vec<usize>,
    /// Class label strings.
    pub label_names: Vec<String>,
}

/// Evaluation metrics recorded at training time. Diagnostics only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    #[serde(default)]
    pub f1_score: Option<f64>,
}

/// Provenance recorded at training time. Diagnostics only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Feature names in training order.
    pub training_features: Vec<String>,
    /// Generation date as written by the trainer.
    pub generated: String,
    /// Trainer software version.
    pub version: String,
}

impl ClassifierArtifact {
    /// Load and validate an artifact from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CoreError::artifact(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate an artifact from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(raw)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check internal consistency. Called on every load.
    pub fn validate(&self) -> Result<()> {
        if self.model.k == 0 {
            return Err(CoreError::artifact("k must be at least 1"));
        }
        if self.model.features.is_empty() {
            return Err(CoreError::artifact("model has no training rows"));
        }
        if self.model.labels.len() != self.model.features.len() {
            return Err(CoreError::artifact(format!(
                "{} labels for {} feature rows",
                self.model.labels.len(),
                self.model.features.len()
            )));
        }
        if self.model.label_names.is_empty() {
            return Err(CoreError::artifact("empty label set"));
        }
        for (i, row) in self.model.features.iter().enumerate() {
            if row.len() != FEATURE_DIM {
                return Err(CoreError::artifact(format!(
                    "row {i} has {} features, expected {FEATURE_DIM}",
                    row.len()
                )));
            }
        }
        if let Some(&bad) = self
            .model
            .labels
            .iter()
            .find(|&&l| l >= self.model.label_names.len())
        {
            return Err(CoreError::artifact(format!(
                "label index {bad} out of range for {} names",
                self.model.label_names.len()
            )));
        }
        Ok(())
    }

    /// Class probabilities for a feature vector: the fraction of the k
    /// nearest training rows voting for each class, in `label_names` order.
    #[must_use]
    pub fn predict_proba(&self, features: &[f64; FEATURE_DIM]) -> Vec<f64> {
        let mut neighbors: Vec<(f64, usize)> = self
            .model
            .features
            .iter()
            .zip(self.model.labels.iter())
            .map(|(row, &label)| {
                let dist: f64 = row
                    .iter()
                    .zip(features.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (dist, label)
            })
            .collect();
        neighbors.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let k = self.model.k.min(neighbors.len());
        let mut votes = vec![0.0; self.model.label_names.len()];
        for (_, label) in &neighbors[..k] {
            votes[*label] += 1.0;
        }
        for v in &mut votes {
            *v /= k as f64;
        }
        votes
    }

    #[must_use]
    pub fn label_names(&self) -> &[String] {
        &self.model.label_names
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn toy_artifact() -> ClassifierArtifact {
        ClassifierArtifact {
            model: KnnModel {
                classifier: "knn".into(),
                k: 3,
                features: vec![
                    // still cluster
                    vec![0.1, 0.01, 2.5],
                    vec![0.2, 0.02, 2.4],
                    vec![0.1, 0.05, 2.6],
                    // walking cluster
                    vec![1.5, 1.0, 0.8],
                    vec![2.0, 1.4, 0.6],
                    vec![2.5, 1.2, 0.7],
                ],
                labels: vec![0, 0, 0, 1, 1, 1],
                label_names: vec!["still".into(), "walking".into()],
            },
            metrics: ModelMetrics {
                accuracy: 0.97,
                f1_score: Some(0.96),
            },
            metadata: ModelMetadata {
                training_features: vec![
                    "DomFreq".into(),
                    "Intensity".into(),
                    "Periodicity".into(),
                ],
                generated: "2025-11-02".into(),
                version: "0.1.0".into(),
            },
        }
    }

    #[test]
    fn round_trips_through_json() {
        let artifact = toy_artifact();
        let raw = serde_json::to_string(&artifact).unwrap();
        let loaded = ClassifierArtifact::from_json(&raw).unwrap();
        assert_eq!(loaded.model.k, 3);
        assert_eq!(loaded.label_names(), &["still", "walking"]);
        assert!((loaded.metrics.accuracy - 0.97).abs() < 1e-12);
    }

    #[test]
    fn unanimous_neighbors_give_probability_one() {
        let artifact = toy_artifact();
        let probs = artifact.predict_proba(&[2.0, 1.2, 0.7]);
        assert_eq!(probs.len(), 2);
        assert!((probs[1] - 1.0).abs() < 1e-12, "walking prob {}", probs[1]);
        assert_eq!(probs[0], 0.0);
    }

    #[test]
    fn split_vote_yields_fraction() {
        let mut artifact = toy_artifact();
        artifact.model.k = 6; // whole training set votes
        let probs = artifact.predict_proba(&[1.0, 0.5, 1.5]);
        assert!((probs[0] - 0.5).abs() < 1e-12);
        assert!((probs[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn validation_catches_ragged_rows() {
        let mut artifact = toy_artifact();
        artifact.model.features[2] = vec![1.0, 2.0];
        assert!(artifact.validate().is_err());

        let mut artifact = toy_artifact();
        artifact.model.labels[0] = 9;
        assert!(artifact.validate().is_err());

        let mut artifact = toy_artifact();
        artifact.model.k = 0;
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn missing_file_is_an_artifact_error() {
        let err = ClassifierArtifact::from_path("/nonexistent/model.json").unwrap_err();
        assert!(matches!(err, CoreError::Artifact(_)));
    }
}
