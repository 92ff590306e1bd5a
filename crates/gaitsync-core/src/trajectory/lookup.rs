//! Lookup-table trajectory variant.
//!
//! Blends two recorded arm-swing profiles bracketing the estimated walking
//! speed. Each bracket keeps its own cycle cursor so profiles of different
//! lengths stay phase-aligned to the device, and brackets are only
//! recomputed when the speed moves far enough to matter.

use tracing::debug;

use crate::config::SpeedCalibration;
use crate::profile::GaitProfileSet;
use crate::types::wrap_angle;

/// Default precision for speed comparisons, in m/s.
pub const DEFAULT_EPSILON: f64 = 0.01;

/// Homing rate while not walking, revolutions per sample.
const HOME_RATE_REV: f64 = 0.001;
/// Angles closer to zero than this stop homing.
const HOME_DEADBAND_REV: f64 = 0.001;

/// Cycle cursor into one bracketed profile.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    profile: usize,
    position: usize,
    increment: i64,
}

/// Profile-blending setpoint generator.
#[derive(Debug, Clone)]
pub struct LookupTableTrajectory {
    profiles: GaitProfileSet,
    calibration: SpeedCalibration,
    epsilon: f64,
    angle: f64,
    past_angle: f64,
    current_speed: f64,
    slow: Option<Cursor>,
    fast: Option<Cursor>,
}

impl LookupTableTrajectory {
    #[must_use]
    pub fn new(
        profiles: GaitProfileSet,
        calibration: SpeedCalibration,
        init_angle_rev: f64,
        epsilon: f64,
    ) -> Self {
        let angle = wrap_angle(init_angle_rev);
        Self {
            profiles,
            calibration,
            epsilon,
            angle,
            past_angle: angle,
            current_speed: 0.0,
            slow: None,
            fast: None,
        }
    }

    /// Current device angle in revolutions.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Update the device angle, remembering the previous one for swing
    /// direction detection. Wraps into `(-0.5, 0.5]`.
    pub fn set_angle(&mut self, value: f64) {
        self.past_angle = self.angle;
        self.angle = wrap_angle(value);
    }

    /// Speed the brackets were last computed for.
    #[must_use]
    pub fn current_speed(&self) -> f64 {
        self.current_speed
    }

    /// Next position setpoint in revolutions.
    ///
    /// A negative `steps_per_window` is the not-walking sentinel: the arm
    /// homes toward zero and the bracket cursors are left untouched.
    pub fn setpoint(&mut self, steps_per_window: f64, time_window_s: f64) -> f64 {
        if steps_per_window < 0.0 {
            return self.home();
        }

        let est_speed = self.calibration.speed_m_s(steps_per_window, time_window_s);

        // Re-bracket only on a meaningful speed change
        if (self.current_speed - est_speed).abs() > 3.0 * self.epsilon || self.fast.is_none() {
            self.current_speed = est_speed;
            let (slow_idx, fast_idx) = self.profiles.bracket(est_speed, self.epsilon);
            self.fast = Some(self.locate(fast_idx));
            self.slow = slow_idx.map(|i| self.locate(i));
            debug!(
                speed = est_speed,
                slow = ?slow_idx,
                fast = fast_idx,
                "re-bracketed gait profiles"
            );
        }

        let Some(mut fast) = self.fast else {
            // Unreachable after re-bracketing; hold position regardless
            return self.angle;
        };
        self.advance(&mut fast);
        let fast_value = self.profiles.get(fast.profile).angle(fast.position);
        self.fast = Some(fast);

        match self.slow {
            Some(mut slow) => {
                self.advance(&mut slow);
                let slow_value = self.profiles.get(slow.profile).angle(slow.position);
                let slow_speed = self.profiles.get(slow.profile).speed_m_s();
                let fast_speed = self.profiles.get(fast.profile).speed_m_s();
                self.slow = Some(slow);

                let alpha = (fast_speed - self.current_speed) / (fast_speed - slow_speed);
                alpha * slow_value + (1.0 - alpha) * fast_value
            }
            // Outside the stored range or dead-on a profile: no blending
            None => fast_value,
        }
    }

    /// Creep toward zero while not walking.
    fn home(&mut self) -> f64 {
        if self.angle.abs() < HOME_DEADBAND_REV {
            // Close enough; stop creeping
        } else if self.angle < 0.0 {
            self.set_angle(self.angle + HOME_RATE_REV);
        } else {
            self.set_angle(self.angle - HOME_RATE_REV);
        }
        self.angle
    }

    /// Find where along a profile the arm currently is, and which way the
    /// cursor should walk to follow the swing.
    fn locate(&self, profile_idx: usize) -> Cursor {
        let profile = self.profiles.get(profile_idx);
        let swing_forward = self.angle <= self.past_angle;
        let position = profile.nearest_index(self.angle);
        let len = profile.len();
        let before = (position + len - 1) % len;

        let descending_here = profile.angle(position) <= profile.angle(before);
        let increment = if descending_here == swing_forward { 1 } else { -1 };
        Cursor {
            profile: profile_idx,
            position,
            increment,
        }
    }

    fn advance(&self, cursor: &mut Cursor) {
        let len = self.profiles.get(cursor.profile).len() as i64;
        cursor.position = (cursor.position as i64 + cursor.increment).rem_euclid(len) as usize;
    }
}
