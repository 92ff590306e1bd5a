//! Core data types shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Sentinel reported by the cadence tracker when the wearer is not walking.
pub const NOT_WALKING: f64 = -1.0;

/// Wrap an angle in revolutions into `(-0.5, 0.5]`.
///
/// `0.7` becomes `-0.3`, `-0.6` becomes `0.4`.
#[must_use]
pub fn wrap_angle(rev: f64) -> f64 {
    let mut wrapped = rev.rem_euclid(1.0);
    if wrapped > 0.5 {
        wrapped -= 1.0;
    }
    wrapped
}

/// Activity recognized by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityState {
    /// Confidence below threshold; no activity claimed.
    Unknown,
    /// Signal power too low for any activity.
    Still,
    /// A recognized activity label from the model's label set.
    Activity(String),
}

impl ActivityState {
    /// True when the state is the named activity.
    #[must_use]
    pub fn is(&self, label: &str) -> bool {
        matches!(self, Self::Activity(l) if l == label)
    }
}

impl std::fmt::Display for ActivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Still => write!(f, "still"),
            Self::Activity(label) => write!(f, "{label}"),
        }
    }
}

/// One classification result: the state plus the confidence behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub state: ActivityState,
    /// Top class probability from the model, regardless of outcome.
    pub confidence: f64,
}

/// Cadence tracker output for one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CadenceEstimate {
    /// Estimated steps over the measurement window, or [`NOT_WALKING`].
    pub steps_per_window: f64,
    /// Estimated seconds until the next foot strike, or [`NOT_WALKING`].
    pub time_till_step: f64,
    /// Cumulative detected steps; -1 before the first computation.
    pub step_count: i64,
}

impl CadenceEstimate {
    /// Sentinel estimate while the wearer is not walking. The step count
    /// persists across pauses.
    #[must_use]
    pub fn not_walking(step_count: i64) -> Self {
        Self {
            steps_per_window: NOT_WALKING,
            time_till_step: NOT_WALKING,
            step_count,
        }
    }

    /// True when the estimate carries real cadence values.
    #[must_use]
    pub fn is_walking(&self) -> bool {
        self.steps_per_window >= 0.0
    }
}

/// One actuator command emitted per control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Setpoint {
    /// Elbow position in revolutions, wrapped to `(-0.5, 0.5]`.
    pub elbow_rev: f64,
    /// Shoulder position in revolutions; `None` outside double-pendulum mode.
    pub shoulder_rev: Option<f64>,
    /// Step frequency in Hz for velocity-mode actuators; 0 when not walking.
    pub cadence_hz: f64,
}

impl Setpoint {
    /// Arm at rest pointing down, no cadence.
    #[must_use]
    pub fn rest() -> Self {
        Self {
            elbow_rev: 0.0,
            shoulder_rev: None,
            cadence_hz: 0.0,
        }
    }
}

impl Default for Setpoint {
    fn default() -> Self {
        Self::rest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_angle_folds_into_half_turn() {
        assert!((wrap_angle(0.7) - (-0.3)).abs() < 1e-12);
        assert!((wrap_angle(-0.6) - 0.4).abs() < 1e-12);
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-12);
        assert!((wrap_angle(-0.5) - 0.5).abs() < 1e-12);
        assert!((wrap_angle(1.5) - 0.5).abs() < 1e-12);
        assert!((wrap_angle(0.25) - 0.25).abs() < 1e-12);
        assert_eq!(wrap_angle(0.0), 0.0);
    }

    #[test]
    fn not_walking_estimate_carries_sentinels() {
        let est = CadenceEstimate::not_walking(42);
        assert_eq!(est.steps_per_window, NOT_WALKING);
        assert_eq!(est.time_till_step, NOT_WALKING);
        assert_eq!(est.step_count, 42);
        assert!(!est.is_walking());
    }

    #[test]
    fn activity_state_matching() {
        let walking = ActivityState::Activity("walking".into());
        assert!(walking.is("walking"));
        assert!(!walking.is("running"));
        assert!(!ActivityState::Still.is("walking"));
        assert_eq!(walking.to_string(), "walking");
    }
}
