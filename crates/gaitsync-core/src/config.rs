//! Pipeline configuration and calibration tables.
//!
//! Calibration constants are data, not code: the defaults reproduce the
//! original single-subject fits (step-rate to speed) and the Perry &
//! Burnfield arm-swing projections, and can be replaced per wearer without
//! touching the algorithms.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// How the cadence tracker derives stride timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CadenceMethod {
    /// Peak/valley tracking on the filtered window.
    Direct,
    /// Dominant spectral frequency of the window.
    Indirect,
}

impl FromStr for CadenceMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "direct" => Ok(Self::Direct),
            "indirect" => Ok(Self::Indirect),
            other => Err(CoreError::config(format!(
                "unknown cadence method '{other}', expected 'direct' or 'indirect'"
            ))),
        }
    }
}

/// One segment of the piecewise step-rate fit: `speed = (x - offset) / denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub offset: f64,
    pub denominator: f64,
}

impl LinearFit {
    fn apply(&self, x: f64) -> f64 {
        (x - self.offset) / self.denominator
    }
}

/// Piecewise-linear conversion from step rate to walking speed in m/s.
///
/// The step count is first normalized to a 30 s window; the fit segment is
/// chosen by which side of the knees the normalized count falls on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedCalibration {
    /// Window length the fits were regressed against, in seconds.
    pub time_normalizer_s: f64,
    /// Normalized step counts bounding the middle segment.
    pub low_knee: f64,
    pub high_knee: f64,
    pub below: LinearFit,
    pub mid: LinearFit,
    pub above: LinearFit,
}

impl SpeedCalibration {
    /// Estimated walking speed in m/s for a step count over `time_window_s`.
    #[must_use]
    pub fn speed_m_s(&self, steps: f64, time_window_s: f64) -> f64 {
        let scaled = steps * self.time_normalizer_s / time_window_s;
        if scaled < self.low_knee {
            self.below.apply(scaled)
        } else if scaled > self.high_knee {
            self.above.apply(scaled)
        } else {
            self.mid.apply(scaled)
        }
    }
}

impl Default for SpeedCalibration {
    fn default() -> Self {
        Self {
            time_normalizer_s: 30.0,
            low_knee: 52.0,
            high_knee: 57.0,
            below: LinearFit {
                offset: 37.0,
                denominator: 15.0,
            },
            mid: LinearFit {
                offset: 27.0,
                denominator: 25.0,
            },
            above: LinearFit {
                offset: 39.0,
                denominator: 15.0,
            },
        }
    }
}

/// Linear speed-to-swing-angle projection for one joint.
///
/// `swing_angle = base_angle + (base_speed - speed) / angle_conv`, in
/// degrees, returned in revolutions. The sign of `angle_conv` encodes the
/// joint's swing direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointCalibration {
    /// Fixed extreme of the counter-swing, in revolutions.
    pub extreme_rev: f64,
    /// Reference swing angle in degrees at `base_speed_m_s`.
    pub base_angle_deg: f64,
    /// Reference walking speed in m/s.
    pub base_speed_m_s: f64,
    /// Speed difference per degree of swing angle.
    pub angle_conv: f64,
}

impl JointCalibration {
    /// Swing target in revolutions for the estimated walking speed.
    #[must_use]
    pub fn swing_angle_rev(&self, speed_m_s: f64) -> f64 {
        let angle_deg =
            self.base_angle_deg + (self.base_speed_m_s - speed_m_s) / self.angle_conv;
        angle_deg / 360.0
    }

    /// Elbow projection from Perry & Burnfield, "Gait Analysis: Normal and
    /// Pathological Function", 2nd ed., pp. 131-136.
    #[must_use]
    pub fn elbow() -> Self {
        Self {
            extreme_rev: -17.0 / 360.0,
            base_angle_deg: -47.0,
            base_speed_m_s: 92.0 / 60.0,
            angle_conv: 0.6 / 8.0,
        }
    }

    /// Shoulder projection, same source. The negated conversion folds in
    /// that the shoulder extends where the elbow flexes.
    #[must_use]
    pub fn shoulder() -> Self {
        Self {
            extreme_rev: -8.0 / 360.0,
            base_angle_deg: 24.0,
            base_speed_m_s: 92.0 / 60.0,
            angle_conv: -0.6 / 7.0,
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Incoming sample rate in Hz.
    pub sample_rate_hz: f64,
    /// Retention of the sample window in seconds.
    pub window_duration_s: f64,
    /// Slice handed to the activity classifier, in seconds.
    pub classifier_window_s: f64,
    /// Slice handed to the cadence tracker, in seconds.
    pub cadence_window_s: f64,
    /// Minimum classification confidence.
    pub confidence_threshold: f64,
    pub cadence_method: CadenceMethod,
    /// Stride history entries kept for the recency-weighted average.
    pub stride_history_len: usize,
    pub speed_calibration: SpeedCalibration,
    pub elbow: JointCalibration,
    pub shoulder: JointCalibration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 100.0,
            window_duration_s: 4.0,
            classifier_window_s: 3.5,
            cadence_window_s: 3.5,
            confidence_threshold: 0.8,
            cadence_method: CadenceMethod::Indirect,
            stride_history_len: 5,
            speed_calibration: SpeedCalibration::default(),
            elbow: JointCalibration::elbow(),
            shoulder: JointCalibration::shoulder(),
        }
    }
}

impl PipelineConfig {
    /// Start building a configuration from the defaults.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate_hz > 0.0) {
            return Err(CoreError::config(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if !(self.window_duration_s > 0.0) {
            return Err(CoreError::config(format!(
                "window duration must be positive, got {}",
                self.window_duration_s
            )));
        }
        if self.classifier_window_s > self.window_duration_s {
            return Err(CoreError::config(format!(
                "classifier window {} s exceeds retained window {} s",
                self.classifier_window_s, self.window_duration_s
            )));
        }
        if self.cadence_window_s > self.window_duration_s {
            return Err(CoreError::config(format!(
                "cadence window {} s exceeds retained window {} s",
                self.cadence_window_s, self.window_duration_s
            )));
        }
        if self.stride_history_len == 0 {
            return Err(CoreError::config("stride history length must be at least 1"));
        }
        Ok(())
    }
}

/// Fluent builder for [`PipelineConfig`].
#[derive(Debug, Default, Clone)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    #[must_use]
    pub fn sample_rate_hz(mut self, rate: f64) -> Self {
        self.config.sample_rate_hz = rate;
        self
    }

    #[must_use]
    pub fn window_duration_s(mut self, duration: f64) -> Self {
        self.config.window_duration_s = duration;
        self
    }

    #[must_use]
    pub fn classifier_window_s(mut self, duration: f64) -> Self {
        self.config.classifier_window_s = duration;
        self
    }

    #[must_use]
    pub fn cadence_window_s(mut self, duration: f64) -> Self {
        self.config.cadence_window_s = duration;
        self
    }

    #[must_use]
    pub fn confidence_threshold(mut self, threshold: f64) -> Self {
        self.config.confidence_threshold = threshold;
        self
    }

    #[must_use]
    pub fn cadence_method(mut self, method: CadenceMethod) -> Self {
        self.config.cadence_method = method;
        self
    }

    #[must_use]
    pub fn stride_history_len(mut self, len: usize) -> Self {
        self.config.stride_history_len = len;
        self
    }

    #[must_use]
    pub fn speed_calibration(mut self, calibration: SpeedCalibration) -> Self {
        self.config.speed_calibration = calibration;
        self
    }

    #[must_use]
    pub fn elbow(mut self, calibration: JointCalibration) -> Self {
        self.config.elbow = calibration;
        self
    }

    #[must_use]
    pub fn shoulder(mut self, calibration: JointCalibration) -> Self {
        self.config.shoulder = calibration;
        self
    }

    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
