//! Bang-bang spline trajectory variant.
//!
//! Plans a symmetric triangular-velocity move from the current angle to a
//! speed-calibrated swing target, timed to land on the predicted foot
//! strike. Waypoints are queued and consumed one per control cycle;
//! successive swings alternate direction. Optionally drives a shoulder
//! joint as a double pendulum.

use std::collections::VecDeque;

use tracing::debug;

use crate::config::{JointCalibration, SpeedCalibration};
use crate::error::{CoreError, Result};
use crate::types::wrap_angle;

/// Homing rate while not walking, revolutions per sample.
const HOME_RATE_REV: f64 = 0.001;
/// Angles closer to zero than this stop homing.
const HOME_DEADBAND_REV: f64 = 0.005;
/// Shortest lead time a move can be planned into, in seconds.
const MIN_LEAD_TIME_S: f64 = 0.2;

/// Spline setpoint generator.
#[derive(Debug, Clone)]
pub struct SplineTrajectory {
    sample_rate_hz: f64,
    speed_calibration: SpeedCalibration,
    elbow_cal: JointCalibration,
    shoulder_cal: JointCalibration,
    double_pendulum: bool,
    elbow_angle: f64,
    shoulder_angle: f64,
    elbow_queue: VecDeque<f64>,
    shoulder_queue: VecDeque<f64>,
    swing_forward: bool,
    time_till_step: f64,
}

impl SplineTrajectory {
    pub fn new(
        sample_rate_hz: f64,
        speed_calibration: SpeedCalibration,
        elbow_cal: JointCalibration,
        shoulder_cal: JointCalibration,
        double_pendulum: bool,
    ) -> Result<Self> {
        if !(sample_rate_hz > 0.0) {
            return Err(CoreError::config(format!(
                "sample rate must be positive, got {sample_rate_hz}"
            )));
        }
        Ok(Self {
            sample_rate_hz,
            speed_calibration,
            elbow_cal,
            shoulder_cal,
            double_pendulum,
            elbow_angle: 0.0,
            shoulder_angle: 0.0,
            elbow_queue: VecDeque::new(),
            shoulder_queue: VecDeque::new(),
            swing_forward: true,
            time_till_step: -1.0,
        })
    }

    /// Current elbow angle in revolutions.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.elbow_angle
    }

    /// Set the elbow angle, wrapped into `(-0.5, 0.5]`.
    pub fn set_angle(&mut self, value: f64) {
        self.elbow_angle = wrap_angle(value);
    }

    /// Current shoulder angle; `None` outside double-pendulum mode.
    #[must_use]
    pub fn shoulder_angle(&self) -> Option<f64> {
        self.double_pendulum.then_some(self.shoulder_angle)
    }

    /// Set the shoulder angle; ignored outside double-pendulum mode.
    pub fn set_shoulder_angle(&mut self, value: f64) {
        if self.double_pendulum {
            self.shoulder_angle = wrap_angle(value);
        }
    }

    /// Next position setpoint(s) in revolutions.
    ///
    /// A negative `steps_per_window` is the not-walking sentinel: waypoint
    /// queues are dropped and both joints home toward zero. While walking,
    /// an empty queue triggers a replan unless the predicted strike is too
    /// close to land a smooth move on.
    pub fn setpoint(
        &mut self,
        steps_per_window: f64,
        time_window_s: f64,
        time_till_step: f64,
    ) -> (f64, Option<f64>) {
        if steps_per_window < 0.0 {
            self.elbow_queue.clear();
            self.shoulder_queue.clear();
            self.elbow_angle = Self::home_step(self.elbow_angle);
            if self.double_pendulum {
                self.shoulder_angle = Self::home_step(self.shoulder_angle);
            }
            return (self.elbow_angle, self.shoulder_angle());
        }

        self.time_till_step = time_till_step;
        if self.elbow_queue.is_empty() {
            if self.time_till_step <= MIN_LEAD_TIME_S {
                // Not enough runway to land a move on the strike; hold
                return (self.elbow_angle, self.shoulder_angle());
            }
            self.replan(steps_per_window, time_window_s);
        }

        let elbow = self.elbow_queue.pop_front().unwrap_or(self.elbow_angle);
        let shoulder = if self.double_pendulum {
            Some(
                self.shoulder_queue
                    .pop_front()
                    .unwrap_or(self.shoulder_angle),
            )
        } else {
            None
        };
        (elbow, shoulder)
    }

    fn replan(&mut self, steps_per_window: f64, time_window_s: f64) {
        let speed = self
            .speed_calibration
            .speed_m_s(steps_per_window, time_window_s);
        let elbow_swing = self.elbow_cal.swing_angle_rev(speed);
        let shoulder_swing = self.shoulder_cal.swing_angle_rev(speed);

        if self.swing_forward {
            self.elbow_queue = self.plan(elbow_swing, self.elbow_angle, self.time_till_step);
            if self.double_pendulum {
                self.shoulder_queue = self.plan(
                    self.shoulder_cal.extreme_rev,
                    self.shoulder_angle,
                    self.time_till_step,
                );
            }
        } else {
            self.elbow_queue = self.plan(
                self.elbow_cal.extreme_rev,
                self.elbow_angle,
                self.time_till_step,
            );
            if self.double_pendulum {
                self.shoulder_queue =
                    self.plan(shoulder_swing, self.shoulder_angle, self.time_till_step);
            }
        }
        self.swing_forward = !self.swing_forward;

        debug!(
            speed,
            waypoints = self.elbow_queue.len(),
            lead_s = self.time_till_step,
            "planned swing"
        );
    }

    /// Bang-bang move from `current` to `target` spanning `duration_s`.
    ///
    /// Per-sample velocity ramps linearly from zero to the peak at the
    /// midpoint and back to zero, mirrored around the midpoint, and the
    /// steps are normalized against their own sum so the move integrates
    /// to exactly `target - current` even when the duration is not a
    /// whole number of samples.
    #[must_use]
    pub fn plan(&self, target_rev: f64, current_rev: f64, duration_s: f64) -> VecDeque<f64> {
        let displacement = target_rev - current_rev;
        let half = (duration_s * self.sample_rate_hz * 0.5) as usize;
        if half == 0 {
            // Less than two samples of runway: step straight to the target
            return VecDeque::from([target_rev]);
        }
        let count = 2 * half + 1;
        let weight_sum = (half * half) as f64;

        let mut angle = current_rev;
        (0..count)
            .map(|i| {
                let tri = i.min(count - 1 - i) as f64;
                angle += displacement * tri / weight_sum;
                angle
            })
            .collect()
    }

    fn home_step(angle: f64) -> f64 {
        if angle.abs() < HOME_DEADBAND_REV {
            angle
        } else if angle < 0.0 {
            wrap_angle(angle + HOME_RATE_REV)
        } else {
            wrap_angle(angle - HOME_RATE_REV)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f64 = 100.0;

    fn single() -> SplineTrajectory {
        SplineTrajectory::new(
            RATE,
            SpeedCalibration::default(),
            JointCalibration::elbow(),
            JointCalibration::shoulder(),
            false,
        )
        .unwrap()
    }

    fn double() -> SplineTrajectory {
        SplineTrajectory::new(
            RATE,
            SpeedCalibration::default(),
            JointCalibration::elbow(),
            JointCalibration::shoulder(),
            true,
        )
        .unwrap()
    }

    #[test]
    fn plan_starts_at_rest_and_lands_on_target() {
        let g = single();
        let current = 0.02;
        let target = -0.1;
        let traj = g.plan(target, current, 0.5);

        // First velocity sample is zero: first waypoint equals the start
        assert!((traj[0] - current).abs() < 1e-12);
        // Last velocity sample is zero: final two waypoints coincide
        let n = traj.len();
        assert!((traj[n - 1] - traj[n - 2]).abs() < 1e-12);
        // Displacement integrates to the commanded move
        assert!(
            (traj[n - 1] - target).abs() < 1e-9,
            "landed at {} instead of {target}",
            traj[n - 1]
        );
        // 0.5 s at 100 Hz: 25 up, peak, 25 down
        assert_eq!(n, 51);
    }

    #[test]
    fn plan_velocity_profile_is_symmetric() {
        let g = single();
        let traj: Vec<f64> = g.plan(-0.1, 0.0, 0.5).into_iter().collect();
        let mut vels: Vec<f64> = traj.windows(2).map(|w| w[1] - w[0]).collect();
        // The start is itself the first waypoint, so the leading velocity
        // sample is the zero step onto it
        vels.insert(0, traj[0] - 0.0);
        let n = vels.len();
        assert_eq!(vels[0], 0.0);
        assert_eq!(vels[n - 1], 0.0);
        for i in 0..n / 2 {
            assert!(
                (vels[i] - vels[n - 1 - i]).abs() < 1e-12,
                "velocity asymmetry at {i}"
            );
        }
        // Peak velocity sits at the midpoint
        let peak = vels.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!((vels[n / 2].abs() - peak).abs() < 1e-15);
    }

    #[test]
    fn plan_lands_on_target_for_non_round_durations() {
        let g = single();
        let current = 0.02;
        let target = -0.1;
        for &duration in &[0.437, 0.51, 0.333] {
            let traj = g.plan(target, current, duration);
            let n = traj.len();
            assert!(
                (traj[n - 1] - target).abs() < 1e-9,
                "duration {duration} landed at {}",
                traj[n - 1]
            );
            assert!((traj[0] - current).abs() < 1e-12);
            assert!((traj[n - 1] - traj[n - 2]).abs() < 1e-12);
        }
    }

    #[test]
    fn short_lead_time_holds_position() {
        let mut g = single();
        g.set_angle(0.1);
        let (elbow, shoulder) = g.setpoint(8.0, 4.0, 0.1);
        assert_eq!(elbow, 0.1);
        assert_eq!(shoulder, None);
    }

    #[test]
    fn swings_alternate_direction() {
        let mut g = single();
        // First swing goes to the speed-calibrated flex target
        let (first, _) = g.setpoint(8.0, 4.0, 0.5);
        let mut last = first;
        // Drain the remaining 50 of the 51 waypoints exactly
        for _ in 0..50 {
            let (v, _) = g.setpoint(8.0, 4.0, 0.5);
            last = v;
        }
        let speed = SpeedCalibration::default().speed_m_s(8.0, 4.0);
        let flex_target = JointCalibration::elbow().swing_angle_rev(speed);
        assert!((last - flex_target).abs() < 1e-6, "first swing ended at {last}");

        // Feed the landing angle back and drain the second swing
        g.set_angle(last);
        for _ in 0..51 {
            let (v, _) = g.setpoint(8.0, 4.0, 0.5);
            last = v;
        }
        assert!(
            (last - JointCalibration::elbow().extreme_rev).abs() < 1e-6,
            "counter-swing ended at {last}"
        );
    }

    #[test]
    fn not_walking_clears_queues_and_homes() {
        let mut g = double();
        g.set_angle(0.1);
        g.set_shoulder_angle(-0.05);
        g.setpoint(8.0, 4.0, 0.5); // fills the queues

        let (elbow, shoulder) = g.setpoint(-1.0, 4.0, -1.0);
        let shoulder = shoulder.unwrap();
        assert!((elbow - 0.099).abs() < 1e-9);
        assert!((shoulder - (-0.049)).abs() < 1e-9);

        // Homing continues on the next cycle; no stale waypoints replay
        let (elbow2, _) = g.setpoint(-1.0, 4.0, -1.0);
        assert!(elbow2.abs() < elbow.abs());
    }

    #[test]
    fn double_pendulum_emits_both_joints() {
        let mut g = double();
        let (_, shoulder) = g.setpoint(8.0, 4.0, 0.5);
        assert!(shoulder.is_some());
        // Forward swing drives the shoulder toward its fixed flex extreme;
        // drain the remaining 50 of the 51 waypoints exactly
        let mut last_sh = 0.0;
        for _ in 0..50 {
            let (_, sh) = g.setpoint(8.0, 4.0, 0.5);
            if let Some(sh) = sh {
                last_sh = sh;
            }
        }
        assert!(
            (last_sh - JointCalibration::shoulder().extreme_rev).abs() < 1e-6
        );
    }
}
