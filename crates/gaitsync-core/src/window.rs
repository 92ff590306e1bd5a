//! Bounded FIFO over the incoming acceleration-magnitude stream.

use std::collections::VecDeque;
use tracing::warn;

use crate::error::{CoreError, Result};

/// Shortest retention the window will accept; shorter requests are
/// auto-corrected with a warning.
pub const MIN_WINDOW_S: f64 = 1.0;

/// Sliding window of the most recent magnitude samples.
///
/// Capacity is `ceil(time_limit_s * rate_hz)`; appending at capacity evicts
/// the oldest sample. All reads return samples in chronological order.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    rate_hz: f64,
    time_limit_s: f64,
    capacity: usize,
    queue: VecDeque<f64>,
}

impl SampleWindow {
    /// Create an empty window retaining `time_limit_s` seconds of data.
    pub fn new(rate_hz: f64, time_limit_s: f64) -> Result<Self> {
        if !(rate_hz > 0.0) {
            return Err(CoreError::config(format!(
                "sample rate must be positive, got {rate_hz}"
            )));
        }
        let time_limit_s = Self::corrected_limit(time_limit_s);
        let capacity = (time_limit_s * rate_hz).ceil() as usize;
        Ok(Self {
            rate_hz,
            time_limit_s,
            capacity,
            queue: VecDeque::with_capacity(capacity),
        })
    }

    fn corrected_limit(time_limit_s: f64) -> f64 {
        if time_limit_s < MIN_WINDOW_S {
            warn!(
                requested_s = time_limit_s,
                corrected_s = MIN_WINDOW_S,
                "window duration below minimum, auto-correcting"
            );
            MIN_WINDOW_S
        } else {
            time_limit_s
        }
    }

    /// Append one magnitude sample, evicting the oldest at capacity.
    pub fn append(&mut self, magnitude: f64) {
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(magnitude);
    }

    /// Append the Euclidean norm of a raw three-axis reading.
    pub fn append_xyz(&mut self, x: f64, y: f64, z: f64) {
        self.append((x * x + y * y + z * z).sqrt());
    }

    /// The newest `duration_s` seconds of samples in chronological order,
    /// or `None` while fewer samples have been collected (cold start).
    #[must_use]
    pub fn latest(&self, duration_s: f64) -> Option<Vec<f64>> {
        let n = ((duration_s * self.rate_hz).ceil() as usize).min(self.capacity);
        if self.queue.len() < n || n == 0 {
            return None;
        }
        Some(
            self.queue
                .iter()
                .skip(self.queue.len() - n)
                .copied()
                .collect(),
        )
    }

    /// The newest `n` samples in chronological order. When fewer are
    /// available, returns everything and warns about the truncation.
    #[must_use]
    pub fn entries(&self, n: usize) -> Vec<f64> {
        if n > self.queue.len() {
            warn!(
                requested = n,
                available = self.queue.len(),
                "requested more entries than held, returning whole window"
            );
            return self.queue.iter().copied().collect();
        }
        self.queue
            .iter()
            .skip(self.queue.len() - n)
            .copied()
            .collect()
    }

    /// Change the retention, preserving the newest samples that still fit.
    pub fn set_time_limit(&mut self, time_limit_s: f64) {
        self.time_limit_s = Self::corrected_limit(time_limit_s);
        self.capacity = (self.time_limit_s * self.rate_hz).ceil() as usize;
        while self.queue.len() > self.capacity {
            self.queue.pop_front();
        }
    }

    /// Drop all held samples.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn time_limit_s(&self) -> f64 {
        self.time_limit_s
    }

    #[must_use]
    pub fn sample_rate_hz(&self) -> f64 {
        self.rate_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_bounds_the_queue() {
        let mut w = SampleWindow::new(10.0, 2.0).unwrap();
        assert_eq!(w.capacity(), 20);
        for i in 0..100 {
            w.append(f64::from(i));
        }
        assert_eq!(w.len(), 20);
        // Oldest surviving sample is 80
        assert_eq!(w.entries(20)[0], 80.0);
    }

    #[test]
    fn entries_are_chronological_and_truncated() {
        let mut w = SampleWindow::new(10.0, 1.0).unwrap();
        for i in 0..5 {
            w.append(f64::from(i));
        }
        assert_eq!(w.entries(3), vec![2.0, 3.0, 4.0]);
        // More than available: whole queue, oldest first
        assert_eq!(w.entries(50), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(w.entries(0).is_empty());
    }

    #[test]
    fn latest_is_none_during_cold_start() {
        let mut w = SampleWindow::new(10.0, 2.0).unwrap();
        for i in 0..9 {
            w.append(f64::from(i));
        }
        assert!(w.latest(1.0).is_none());
        w.append(9.0);
        let slice = w.latest(1.0).unwrap();
        assert_eq!(slice.len(), 10);
        assert_eq!(slice[0], 0.0);
        assert_eq!(slice[9], 9.0);
    }

    #[test]
    fn sub_second_window_is_corrected() {
        let w = SampleWindow::new(100.0, 0.25).unwrap();
        assert_eq!(w.time_limit_s(), MIN_WINDOW_S);
        assert_eq!(w.capacity(), 100);
    }

    #[test]
    fn shrinking_limit_keeps_newest() {
        let mut w = SampleWindow::new(10.0, 3.0).unwrap();
        for i in 0..30 {
            w.append(f64::from(i));
        }
        w.set_time_limit(1.0);
        assert_eq!(w.capacity(), 10);
        assert_eq!(w.entries(10)[0], 20.0);
    }

    #[test]
    fn growing_limit_keeps_data_and_clear_empties() {
        let mut w = SampleWindow::new(10.0, 1.0).unwrap();
        for i in 0..10 {
            w.append(f64::from(i));
        }
        w.set_time_limit(2.0);
        assert_eq!(w.capacity(), 20);
        // Growing evicts nothing
        assert_eq!(w.len(), 10);
        assert_eq!(w.entries(10)[0], 0.0);

        w.clear();
        assert!(w.is_empty());
        assert!(w.latest(1.0).is_none(), "cleared window must cold-start");
        w.append(7.0);
        assert_eq!(w.entries(1), vec![7.0]);
    }

    #[test]
    fn append_xyz_stores_magnitude() {
        let mut w = SampleWindow::new(10.0, 1.0).unwrap();
        w.append_xyz(3.0, 4.0, 0.0);
        assert!((w.entries(1)[0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert!(SampleWindow::new(0.0, 2.0).is_err());
    }
}
