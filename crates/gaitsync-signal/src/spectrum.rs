//! Spectral estimation.
//!
//! Welch's averaged periodogram over Hann-windowed, mean-detrended segments
//! with 50% overlap, plus the derived quantities the classifier and cadence
//! estimator consume: dominant frequency and spectral entropy.

use ndarray::Array1;
use num_complex::Complex64;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

use crate::{Result, SignalError};

/// Minimum segment length for a meaningful spectrum.
const MIN_SEGMENT: usize = 8;

/// One-sided power spectral density estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerSpectrum {
    /// Frequency bins in Hz, DC first.
    pub frequencies: Array1<f64>,
    /// Power density per bin.
    pub power: Array1<f64>,
    /// Frequency resolution (bin spacing) in Hz.
    pub resolution_hz: f64,
}

impl PowerSpectrum {
    /// Frequency and power of the strongest bin.
    #[must_use]
    pub fn dominant(&self) -> (f64, f64) {
        let mut best = (0.0, 0.0);
        for (f, p) in self.frequencies.iter().zip(self.power.iter()) {
            if *p > best.1 {
                best = (*f, *p);
            }
        }
        best
    }

    /// Strongest bin within `[lo_hz, hi_hz]`, or `None` if no bin falls in
    /// the band.
    #[must_use]
    pub fn dominant_in_band(&self, lo_hz: f64, hi_hz: f64) -> Option<(f64, f64)> {
        let mut best: Option<(f64, f64)> = None;
        for (f, p) in self.frequencies.iter().zip(self.power.iter()) {
            if *f < lo_hz || *f > hi_hz {
                continue;
            }
            if best.map_or(true, |(_, bp)| *p > bp) {
                best = Some((*f, *p));
            }
        }
        best
    }

    /// Shannon entropy of the normalized spectrum, in nats.
    ///
    /// Low entropy means power concentrated in few bins (periodic motion);
    /// high entropy means broadband content. Returns 0 for an all-zero
    /// spectrum.
    #[must_use]
    pub fn spectral_entropy(&self) -> f64 {
        let total: f64 = self.power.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        self.power
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| {
                let q = p / total;
                -q * q.ln()
            })
            .sum()
    }

    /// Integrated power across all bins.
    #[must_use]
    pub fn total_power(&self) -> f64 {
        self.power.iter().sum::<f64>() * self.resolution_hz
    }
}

/// Welch power spectral density estimate.
///
/// Segments of `segment_len` samples are Hann-windowed with 50% overlap,
/// mean-detrended, and their one-sided periodograms averaged. When the
/// signal is shorter than `segment_len` a single full-length segment is
/// used, matching the common `nperseg = len` configuration.
pub fn welch(signal: &[f64], sample_rate_hz: f64, segment_len: usize) -> Result<PowerSpectrum> {
    if !(sample_rate_hz > 0.0) {
        return Err(SignalError::InvalidInput(format!(
            "sample rate must be positive, got {sample_rate_hz}"
        )));
    }
    if signal.len() < MIN_SEGMENT {
        return Err(SignalError::InsufficientSamples {
            required: MIN_SEGMENT,
            available: signal.len(),
        });
    }

    let nperseg = segment_len.clamp(MIN_SEGMENT, signal.len());
    let step = nperseg / 2;
    let window = hann_periodic(nperseg);
    let window_power: f64 = window.iter().map(|w| w * w).sum();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(nperseg);

    let n_bins = nperseg / 2 + 1;
    let mut accum = vec![0.0f64; n_bins];
    let mut segments = 0usize;

    let mut start = 0;
    while start + nperseg <= signal.len() {
        let segment = &signal[start..start + nperseg];
        let mean = segment.iter().sum::<f64>() / nperseg as f64;

        let mut buffer: Vec<Complex64> = segment
            .iter()
            .zip(window.iter())
            .map(|(x, w)| Complex64::new((x - mean) * w, 0.0))
            .collect();
        fft.process(&mut buffer);

        // One-sided density: double everything except DC and Nyquist
        let scale = 1.0 / (sample_rate_hz * window_power);
        for (k, value) in buffer.iter().take(n_bins).enumerate() {
            let mut p = value.norm_sqr() * scale;
            if k != 0 && !(nperseg % 2 == 0 && k == n_bins - 1) {
                p *= 2.0;
            }
            accum[k] += p;
        }

        segments += 1;
        start += step;
    }

    let power: Array1<f64> = accum.iter().map(|p| p / segments as f64).collect();
    let resolution_hz = sample_rate_hz / nperseg as f64;
    let frequencies: Array1<f64> = (0..n_bins).map(|k| k as f64 * resolution_hz).collect();

    Ok(PowerSpectrum {
        frequencies,
        power,
        resolution_hz,
    })
}

/// Periodic Hann window of length `n`.
fn hann_periodic(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let x = std::f64::consts::TAU * i as f64 / n as f64;
            0.5 * (1.0 - x.cos())
        })
        .collect()
}
