//! Butterworth IIR filtering.
//!
//! Provides low-pass Butterworth design via the bilinear transform of the
//! analog prototype, a causal direct-form-II-transposed filter, and a
//! zero-phase forward-backward variant for in-window peak localization.

use num_complex::Complex64;
use std::f64::consts::PI;

use crate::{Result, SignalError};

/// Maximum supported filter order. Higher orders lose numeric precision in
/// the direct-form coefficient representation.
const MAX_ORDER: usize = 8;

/// A designed Butterworth filter holding its transfer-function coefficients.
///
/// The filter is normalized so `a[0] == 1` and has unity gain at DC.
#[derive(Debug, Clone)]
pub struct ButterworthFilter {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl ButterworthFilter {
    /// Design a low-pass Butterworth filter.
    ///
    /// - `order`: filter order, 1..=8.
    /// - `cutoff_hz`: -3 dB cutoff frequency.
    /// - `sample_rate_hz`: sampling rate; the cutoff must be below Nyquist.
    pub fn lowpass(order: usize, cutoff_hz: f64, sample_rate_hz: f64) -> Result<Self> {
        if order == 0 || order > MAX_ORDER {
            return Err(SignalError::FilterDesign(format!(
                "order must be in 1..={MAX_ORDER}, got {order}"
            )));
        }
        if !(sample_rate_hz > 0.0) {
            return Err(SignalError::FilterDesign(format!(
                "sample rate must be positive, got {sample_rate_hz}"
            )));
        }
        if !(cutoff_hz > 0.0 && cutoff_hz < sample_rate_hz / 2.0) {
            return Err(SignalError::FilterDesign(format!(
                "cutoff {cutoff_hz} Hz outside (0, {}) Hz",
                sample_rate_hz / 2.0
            )));
        }

        let fs2 = 2.0 * sample_rate_hz;
        // Pre-warp the cutoff for the bilinear transform
        let warped = fs2 * (PI * cutoff_hz / sample_rate_hz).tan();

        // Analog prototype poles on the left half-plane circle, mapped to z
        let z_poles: Vec<Complex64> = (0..order)
            .map(|k| {
                let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
                let s = warped * Complex64::new(theta.cos(), theta.sin());
                (Complex64::new(fs2, 0.0) + s) / (Complex64::new(fs2, 0.0) - s)
            })
            .collect();

        let a: Vec<f64> = poly(&z_poles).iter().map(|c| c.re).collect();

        // Low-pass zeros all sit at z = -1
        let z_zeros = vec![Complex64::new(-1.0, 0.0); order];
        let b_raw: Vec<f64> = poly(&z_zeros).iter().map(|c| c.re).collect();

        // Normalize to unity gain at DC
        let gain = a.iter().sum::<f64>() / b_raw.iter().sum::<f64>();
        let b = b_raw.iter().map(|v| v * gain).collect();

        Ok(Self { b, a })
    }

    /// Transfer-function coefficients `(b, a)`, `a[0] == 1`.
    #[must_use]
    pub fn coefficients(&self) -> (&[f64], &[f64]) {
        (&self.b, &self.a)
    }

    /// Apply the filter causally (direct form II transposed).
    #[must_use]
    pub fn lfilter(&self, input: &[f64]) -> Vec<f64> {
        let mut state = vec![0.0; self.a.len() - 1];
        self.run(input, &mut state)
    }

    /// Apply the filter forward and backward for zero phase distortion.
    ///
    /// Uses odd extension at both ends plus steady-state initial conditions
    /// to suppress startup transients, then trims back to the input length.
    /// Not causal; intended for in-window analysis only.
    #[must_use]
    pub fn filtfilt(&self, input: &[f64]) -> Vec<f64> {
        if input.is_empty() {
            return Vec::new();
        }
        let pad = 3 * (self.a.len() - 1);

        let ext: Vec<f64> = if input.len() > pad {
            let first = input[0];
            let last = input[input.len() - 1];
            let mut ext = Vec::with_capacity(input.len() + 2 * pad);
            for i in (1..=pad).rev() {
                ext.push(2.0 * first - input[i]);
            }
            ext.extend_from_slice(input);
            for j in 1..=pad {
                ext.push(2.0 * last - input[input.len() - 1 - j]);
            }
            ext
        } else {
            input.to_vec()
        };

        let zi = self.steady_state();

        let mut state: Vec<f64> = zi.iter().map(|z| z * ext[0]).collect();
        let forward = self.run(&ext, &mut state);

        let mut reversed: Vec<f64> = forward.into_iter().rev().collect();
        let mut state: Vec<f64> = zi.iter().map(|z| z * reversed[0]).collect();
        reversed = self.run(&reversed, &mut state);
        reversed.reverse();

        if input.len() > pad {
            reversed[pad..pad + input.len()].to_vec()
        } else {
            reversed
        }
    }

    /// Run the direct-form-II-transposed recurrence with the given state.
    fn run(&self, input: &[f64], state: &mut [f64]) -> Vec<f64> {
        let n = self.a.len();
        input
            .iter()
            .map(|&x| {
                let y = self.b[0] * x + state[0];
                for j in 0..n - 1 {
                    let carry = if j + 1 < n - 1 { state[j + 1] } else { 0.0 };
                    state[j] = self.b[j + 1] * x + carry - self.a[j + 1] * y;
                }
                y
            })
            .collect()
    }

    /// Initial filter state producing steady-state output for a unit step.
    fn steady_state(&self) -> Vec<f64> {
        let n = self.a.len();
        let mut zi = vec![0.0; n - 1];
        let mut acc = 0.0;
        for j in (0..n - 1).rev() {
            acc += self.b[j + 1] - self.a[j + 1];
            zi[j] = acc;
        }
        zi
    }
}

/// Expand a monic polynomial from its roots, coefficients in descending
/// powers.
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &root in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }
    coeffs
}
