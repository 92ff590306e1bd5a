//! Activity classification state machine.
//!
//! Extracts three spectral features from a magnitude window, asks the k-NN
//! model for class probabilities, and applies the stillness floor and
//! confidence threshold to settle on a state.

use gaitsync_signal::welch;
use std::path::Path;
use tracing::{debug, warn};

use crate::artifact::{ClassifierArtifact, FEATURE_DIM};
use crate::error::Result;
use crate::types::{ActivityState, Classification};

/// Label the cadence tracker is gated on.
pub const WALKING_LABEL: &str = "walking";

/// Minimum signal power for any activity claim; below it the wearer is
/// treated as still no matter what the model says.
pub const STILLNESS_FLOOR: f64 = 0.2;

const THRESHOLD_HIGH_CLAMP: f64 = 0.95;
const THRESHOLD_LOW_CLAMP: f64 = 0.01;

/// Activity classifier over a loaded model artifact.
#[derive(Debug, Clone)]
pub struct ActivityClassifier {
    artifact: ClassifierArtifact,
    threshold: f64,
    state: ActivityState,
}

impl ActivityClassifier {
    /// Build a classifier around an already-loaded artifact.
    #[must_use]
    pub fn new(artifact: ClassifierArtifact, threshold: f64) -> Self {
        let mut classifier = Self {
            artifact,
            threshold: THRESHOLD_LOW_CLAMP,
            state: ActivityState::Unknown,
        };
        classifier.set_threshold(threshold);
        classifier
    }

    /// Load the artifact from a JSON file. Failure is fatal: the pipeline
    /// cannot run without a model.
    pub fn from_path(path: impl AsRef<Path>, threshold: f64) -> Result<Self> {
        Ok(Self::new(ClassifierArtifact::from_path(path)?, threshold))
    }

    /// Set the confidence threshold, clamping out-of-range values.
    ///
    /// Values above 1 clamp to 0.95 and values at or below 0 clamp to 0.01,
    /// each with a warning; in-range values are kept exactly.
    pub fn set_threshold(&mut self, value: f64) {
        if value > 0.0 && value <= 1.0 {
            self.threshold = value;
        } else if value > 1.0 {
            warn!(
                requested = value,
                clamped = THRESHOLD_HIGH_CLAMP,
                "confidence threshold above 1, clamping"
            );
            self.threshold = THRESHOLD_HIGH_CLAMP;
        } else {
            warn!(
                requested = value,
                clamped = THRESHOLD_LOW_CLAMP,
                "confidence threshold at or below 0, clamping"
            );
            self.threshold = THRESHOLD_LOW_CLAMP;
        }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Most recent classification state.
    #[must_use]
    pub fn state(&self) -> &ActivityState {
        &self.state
    }

    /// True when the current state is the walking activity.
    #[must_use]
    pub fn walking(&self) -> bool {
        self.state.is(WALKING_LABEL)
    }

    #[must_use]
    pub fn artifact(&self) -> &ClassifierArtifact {
        &self.artifact
    }

    /// Spectral features of a magnitude window: dominant frequency (Hz),
    /// intensity (power density at the dominant bin), and periodicity
    /// (spectral entropy of the normalized PSD).
    pub fn extract_features(window: &[f64], sample_rate_hz: f64) -> Result<[f64; FEATURE_DIM]> {
        let psd = welch(window, sample_rate_hz, window.len())?;
        let (dominant_hz, intensity) = psd.dominant();
        Ok([dominant_hz, intensity, psd.spectral_entropy()])
    }

    /// Classify a window and update the state.
    pub fn predict(&mut self, window: &[f64], sample_rate_hz: f64) -> Result<Classification> {
        let features = Self::extract_features(window, sample_rate_hz)?;
        let probs = self.artifact.predict_proba(&features);

        let (best_idx, best_prob) = probs
            .iter()
            .enumerate()
            .fold((0, 0.0), |acc, (i, &p)| if p > acc.1 { (i, p) } else { acc });

        let intensity = features[1];
        self.state = if intensity < STILLNESS_FLOOR {
            ActivityState::Still
        } else if best_prob >= self.threshold {
            ActivityState::Activity(self.artifact.label_names()[best_idx].clone())
        } else {
            ActivityState::Unknown
        };

        debug!(
            state = %self.state,
            confidence = best_prob,
            dominant_hz = features[0],
            intensity,
            "classified window"
        );

        Ok(Classification {
            state: self.state.clone(),
            confidence: best_prob,
        })
    }
}
