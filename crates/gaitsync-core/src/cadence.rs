//! Cadence tracking over the magnitude window.
//!
//! Two methods, fixed at construction. The direct method low-pass filters
//! the window and tracks foot-strike peaks and mid-swing valleys across
//! overlapping windows, maintaining a stride history. The indirect method
//! reads the dominant spectral frequency and keeps no per-peak state.

use std::collections::VecDeque;

use gaitsync_signal::{find_peaks, find_valleys, welch, ButterworthFilter};
use tracing::debug;

use crate::config::CadenceMethod;
use crate::error::{CoreError, Result};
use crate::types::CadenceEstimate;

const FILTER_ORDER: usize = 3;
/// Locomotion band cutoff for the direct method.
const CUTOFF_HZ: f64 = 2.0;
/// Two foot strikes closer than this are one step.
const MIN_STEP_SPACING_S: f64 = 0.25;
/// Stride duration assumed while the history is empty.
const DEFAULT_STRIDE_S: f64 = 1.0;
/// Stride duration reported when the spectrum shows no cadence.
const LONG_STRIDE_S: f64 = 10.0;
/// Dominant frequencies below this are treated as no cadence at all.
const MIN_CADENCE_HZ: f64 = 0.1;

/// Stateful cadence estimator.
#[derive(Debug, Clone)]
pub struct CadenceTracker {
    method: CadenceMethod,
    rate_hz: f64,
    time_window_s: f64,
    filter: ButterworthFilter,
    min_spacing: usize,
    step_count: i64,
    strides: VecDeque<f64>,
    history_cap: usize,
    last_peak: Option<usize>,
    last_valley: Option<usize>,
}

impl CadenceTracker {
    /// Create a tracker measuring over `time_window_s`-second windows.
    pub fn new(
        method: CadenceMethod,
        rate_hz: f64,
        time_window_s: f64,
        history_cap: usize,
    ) -> Result<Self> {
        if !(time_window_s > 0.0) {
            return Err(CoreError::config(format!(
                "measurement window must be positive, got {time_window_s}"
            )));
        }
        if history_cap == 0 {
            return Err(CoreError::config("stride history must hold at least 1 entry"));
        }
        let filter = ButterworthFilter::lowpass(FILTER_ORDER, CUTOFF_HZ, rate_hz)?;
        Ok(Self {
            method,
            rate_hz,
            time_window_s,
            filter,
            min_spacing: (rate_hz * MIN_STEP_SPACING_S) as usize,
            step_count: -1,
            strides: VecDeque::with_capacity(history_cap),
            history_cap,
            last_peak: None,
            last_valley: None,
        })
    }

    #[must_use]
    pub fn method(&self) -> CadenceMethod {
        self.method
    }

    /// Cumulative detected steps; -1 before the first computation.
    #[must_use]
    pub fn step_count(&self) -> i64 {
        self.step_count
    }

    /// Recency-weighted average stride duration in seconds.
    #[must_use]
    pub fn average_stride_s(&self) -> f64 {
        if self.strides.is_empty() {
            return DEFAULT_STRIDE_S;
        }
        let mut num = 0.0;
        let mut den = 0.0;
        for (i, stride) in self.strides.iter().enumerate() {
            let weight = (i + 1) as f64;
            num += weight * stride;
            den += weight;
        }
        num / den
    }

    /// Estimate cadence over the window.
    ///
    /// While not walking the peak/valley pointers reset but the step count
    /// and stride history persist, so a pause does not forget progress.
    pub fn measure(&mut self, window: &[f64], walking: bool) -> Result<CadenceEstimate> {
        if !walking {
            self.last_peak = None;
            self.last_valley = None;
            return Ok(CadenceEstimate::not_walking(self.step_count));
        }
        match self.method {
            CadenceMethod::Direct => Ok(self.measure_direct(window)),
            CadenceMethod::Indirect => self.measure_indirect(window),
        }
    }

    fn measure_direct(&mut self, window: &[f64]) -> CadenceEstimate {
        let smooth = self.filter.filtfilt(window);
        let peaks = find_peaks(&smooth, self.min_spacing);
        let valleys = find_valleys(&smooth, self.min_spacing);

        if self.step_count < 0 {
            self.seed(&peaks, &valleys);
        } else {
            self.update_peak(peaks.last().copied());
            self.update_valley(valleys.last().copied());
        }

        let avg = self.average_stride_s();
        let time_till_step = match self.last_peak {
            Some(peak) => {
                let since_strike = self.time_window_s - peak as f64 / self.rate_hz;
                (avg - since_strike).max(0.0)
            }
            None => avg,
        };

        debug!(
            step_count = self.step_count,
            avg_stride_s = avg,
            last_peak = ?self.last_peak,
            "direct cadence update"
        );

        CadenceEstimate {
            steps_per_window: self.time_window_s / avg,
            time_till_step,
            step_count: self.step_count,
        }
    }

    /// First computation: every peak in the window is a step already taken.
    fn seed(&mut self, peaks: &[usize], valleys: &[usize]) {
        self.step_count = peaks.len() as i64;
        for pair in peaks.windows(2) {
            self.push_stride((pair[1] - pair[0]) as f64 / self.rate_hz);
        }
        self.last_peak = peaks.last().copied();
        self.last_valley = valleys.last().copied();
    }

    fn update_peak(&mut self, newest: Option<usize>) {
        let Some(newest) = newest else {
            // No peaks in this window: slide the pointer with the data
            self.last_peak = self.last_peak.map(|p| p.saturating_sub(1));
            return;
        };
        match (self.last_peak, self.last_valley) {
            (Some(prev_peak), Some(prev_valley)) => {
                if prev_peak < prev_valley && newest > prev_valley {
                    // A full peak-valley-peak sequence: genuine step
                    self.step_count += 1;
                    self.push_stride((newest - prev_peak) as f64 / self.rate_hz);
                    self.last_peak = Some(newest);
                } else if prev_valley < prev_peak && newest > prev_peak {
                    // Remembered peak moved later without an intervening
                    // valley: the earlier detection was premature
                    if let Some(last) = self.strides.back_mut() {
                        *last += (newest - prev_peak) as f64 / self.rate_hz;
                    }
                    self.last_peak = Some(newest);
                } else {
                    self.last_peak = Some(prev_peak.saturating_sub(1));
                }
            }
            (Some(prev_peak), None) => {
                self.last_peak = Some(prev_peak.saturating_sub(1));
            }
            (None, _) => {
                // Resumed after a pause: the first strike seen is a step
                self.step_count += 1;
                self.last_peak = Some(newest);
            }
        }
    }

    fn update_valley(&mut self, newest: Option<usize>) {
        match (self.last_valley, newest) {
            (Some(prev), Some(new)) if new > prev => self.last_valley = Some(new),
            (Some(prev), _) => self.last_valley = Some(prev.saturating_sub(1)),
            (None, new) => self.last_valley = new,
        }
    }

    fn push_stride(&mut self, stride_s: f64) {
        if self.strides.len() == self.history_cap {
            self.strides.pop_front();
        }
        self.strides.push_back(stride_s);
    }

    fn measure_indirect(&mut self, window: &[f64]) -> Result<CadenceEstimate> {
        let psd = welch(window, self.rate_hz, window.len())?;
        let (dominant_hz, _) = psd.dominant();
        let avg = if dominant_hz < MIN_CADENCE_HZ {
            LONG_STRIDE_S
        } else {
            1.0 / dominant_hz
        };
        if self.step_count < 0 {
            self.step_count = 0;
        }
        Ok(CadenceEstimate {
            steps_per_window: self.time_window_s / avg,
            // Peak phase is unknown without peak state; report the full
            // stride as the conservative bound
            time_till_step: avg,
            step_count: self.step_count,
        })
    }
}
