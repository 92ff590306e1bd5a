//! Reference gait profiles.
//!
//! Each profile is a recorded arm-swing cycle for one walking speed, stored
//! as comma-separated `angle,torque` rows. Only the angle column drives the
//! lookup trajectory; torque is recorded for offline analysis.

use std::path::Path;

use crate::error::{CoreError, Result};

/// One arm-swing cycle at a fixed walking speed. Angles in revolutions.
#[derive(Debug, Clone)]
pub struct GaitProfile {
    speed_m_s: f64,
    angles: Vec<f64>,
}

impl GaitProfile {
    /// Build a profile from in-memory angles.
    pub fn new(speed_m_s: f64, angles: Vec<f64>) -> Result<Self> {
        if angles.is_empty() {
            return Err(CoreError::profile(format!(
                "speed {speed_m_s}: profile has no rows"
            )));
        }
        Ok(Self { speed_m_s, angles })
    }

    /// Load the angle column from an `angle,torque` file.
    pub fn from_path(speed_m_s: f64, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CoreError::profile(format!("{}: {e}", path.display())))?;

        let mut angles = Vec::new();
        for (lineno, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let angle_field = line.split(',').next().unwrap_or(line).trim();
            let angle: f64 = angle_field.parse().map_err(|_| {
                CoreError::profile(format!(
                    "{}:{}: malformed angle '{angle_field}'",
                    path.display(),
                    lineno + 1
                ))
            })?;
            angles.push(angle);
        }
        Self::new(speed_m_s, angles)
    }

    #[must_use]
    pub fn speed_m_s(&self) -> f64 {
        self.speed_m_s
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// Stored angle at a cycle position.
    #[must_use]
    pub fn angle(&self, index: usize) -> f64 {
        self.angles[index % self.angles.len()]
    }

    #[must_use]
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Cycle position whose stored angle is closest to `angle`.
    #[must_use]
    pub fn nearest_index(&self, angle: f64) -> usize {
        let mut best = (0, f64::INFINITY);
        for (i, a) in self.angles.iter().enumerate() {
            let diff = (a - angle).abs();
            if diff < best.1 {
                best = (i, diff);
            }
        }
        best.0
    }
}

/// The set of reference profiles, sorted by speed.
#[derive(Debug, Clone)]
pub struct GaitProfileSet {
    profiles: Vec<GaitProfile>,
}

impl GaitProfileSet {
    /// Build the set; at least one profile is required.
    pub fn new(mut profiles: Vec<GaitProfile>) -> Result<Self> {
        if profiles.is_empty() {
            return Err(CoreError::profile("profile set is empty"));
        }
        profiles.sort_by(|a, b| {
            a.speed_m_s
                .partial_cmp(&b.speed_m_s)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(Self { profiles })
    }

    /// Load every `(speed, path)` pair.
    pub fn from_paths(entries: &[(f64, &Path)]) -> Result<Self> {
        let profiles = entries
            .iter()
            .map(|(speed, path)| GaitProfile::from_path(*speed, path))
            .collect::<Result<Vec<_>>>()?;
        Self::new(profiles)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> &GaitProfile {
        &self.profiles[index]
    }

    /// Find the profiles bracketing a walking speed.
    ///
    /// Returns `(slow, fast)` profile indices with `slow < speed < fast`.
    /// `slow` is `None` when the speed matches a stored profile within
    /// `epsilon`, or falls outside the stored range (clamped to the nearest
    /// single profile).
    #[must_use]
    pub fn bracket(&self, speed_m_s: f64, epsilon: f64) -> (Option<usize>, usize) {
        if speed_m_s < self.profiles[0].speed_m_s {
            return (None, 0);
        }
        for i in 1..self.profiles.len() {
            let candidate = self.profiles[i].speed_m_s;
            if (speed_m_s - candidate).abs() < epsilon {
                return (None, i);
            }
            if speed_m_s < candidate {
                return (Some(i - 1), i);
            }
        }
        (None, self.profiles.len() - 1)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    pub(crate) fn toy_set() -> GaitProfileSet {
        // Small sinusoidal swing cycles, amplitude scaled by speed
        let make = |speed: f64| {
            let angles: Vec<f64> = (0..40)
                .map(|i| 0.1 * speed * (std::f64::consts::TAU * i as f64 / 40.0).sin())
                .collect();
            GaitProfile::new(speed, angles).unwrap()
        };
        GaitProfileSet::new(vec![make(1.4), make(0.8), make(1.0), make(1.2)]).unwrap()
    }

    #[test]
    fn set_sorts_by_speed() {
        let set = toy_set();
        let speeds: Vec<f64> = (0..set.len()).map(|i| set.get(i).speed_m_s()).collect();
        assert_eq!(speeds, vec![0.8, 1.0, 1.2, 1.4]);
    }

    #[test]
    fn bracket_covers_all_regimes() {
        let set = toy_set();
        // Below range: clamp to slowest
        assert_eq!(set.bracket(0.5, 0.01), (None, 0));
        // Between stored speeds
        assert_eq!(set.bracket(1.1, 0.01), (Some(1), 2));
        // Matching a stored speed within epsilon
        assert_eq!(set.bracket(1.205, 0.01), (None, 2));
        // Above range: clamp to fastest
        assert_eq!(set.bracket(2.0, 0.01), (None, 3));
    }

    #[test]
    fn nearest_index_finds_closest_angle() {
        let profile = GaitProfile::new(1.0, vec![-0.1, 0.0, 0.1, 0.05]).unwrap();
        assert_eq!(profile.nearest_index(0.04), 3);
        assert_eq!(profile.nearest_index(-0.2), 0);
    }

    #[test]
    fn loads_angle_column_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0.05,1.2").unwrap();
        writeln!(file, "-0.02,0.9").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "0.10,1.5").unwrap();
        file.flush().unwrap();

        let profile = GaitProfile::from_path(1.0, file.path()).unwrap();
        assert_eq!(profile.angles(), &[0.05, -0.02, 0.10]);
    }

    #[test]
    fn malformed_rows_and_empty_sets_are_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not-a-number,1.0").unwrap();
        file.flush().unwrap();
        let err = GaitProfile::from_path(1.0, file.path()).unwrap_err();
        assert!(!err.is_recoverable());

        assert!(GaitProfile::new(1.0, vec![]).is_err());
        assert!(GaitProfileSet::new(vec![]).is_err());
        assert!(GaitProfile::from_path(1.0, "/nonexistent.csv").is_err());
    }
}
