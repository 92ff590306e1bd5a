//! Trajectory generation.
//!
//! Two interchangeable variants behind one tagged enum: the lookup variant
//! replays blended recorded swing profiles, the spline variant synthesizes
//! bang-bang moves timed to the predicted foot strike. The variant is
//! chosen at construction.

pub mod lookup;
pub mod spline;

pub use lookup::LookupTableTrajectory;
pub use spline::SplineTrajectory;

use crate::types::CadenceEstimate;

/// Setpoint generator, one variant fixed at construction.
#[derive(Debug, Clone)]
pub enum TrajectoryGenerator {
    Lookup(LookupTableTrajectory),
    Spline(SplineTrajectory),
}

impl TrajectoryGenerator {
    /// Next `(elbow, shoulder)` setpoint for a cadence estimate.
    ///
    /// The lookup variant has no shoulder and ignores strike timing.
    pub fn setpoint(
        &mut self,
        cadence: &CadenceEstimate,
        time_window_s: f64,
    ) -> (f64, Option<f64>) {
        match self {
            Self::Lookup(g) => (
                g.setpoint(cadence.steps_per_window, time_window_s),
                None,
            ),
            Self::Spline(g) => g.setpoint(
                cadence.steps_per_window,
                time_window_s,
                cadence.time_till_step,
            ),
        }
    }

    /// Current primary (elbow) angle in revolutions.
    #[must_use]
    pub fn angle(&self) -> f64 {
        match self {
            Self::Lookup(g) => g.angle(),
            Self::Spline(g) => g.angle(),
        }
    }

    /// Update the primary angle from device feedback.
    pub fn set_angle(&mut self, value: f64) {
        match self {
            Self::Lookup(g) => g.set_angle(value),
            Self::Spline(g) => g.set_angle(value),
        }
    }

    /// Current shoulder angle; `None` unless a double-pendulum spline.
    #[must_use]
    pub fn shoulder_angle(&self) -> Option<f64> {
        match self {
            Self::Lookup(_) => None,
            Self::Spline(g) => g.shoulder_angle(),
        }
    }

    /// Update the shoulder angle; ignored by variants without one.
    pub fn set_shoulder_angle(&mut self, value: f64) {
        if let Self::Spline(g) = self {
            g.set_shoulder_angle(value);
        }
    }
}
