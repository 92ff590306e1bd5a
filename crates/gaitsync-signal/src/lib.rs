//! Signal processing primitives for gait-synchronized prosthetic control.
//!
//! This crate provides the DSP building blocks used by the `gaitsync-core`
//! control loop, with no knowledge of gait semantics:
//!
//! - **Filtering**: Butterworth low-pass IIR design with causal and
//!   zero-phase (forward-backward) application.
//! - **Spectral estimation**: Welch-style averaged periodogram, dominant
//!   frequency lookup, and spectral entropy.
//! - **Peak detection**: local extrema with minimum-distance pruning.
//!
//! # Example
//!
//! ```rust
//! use gaitsync_signal::{filter::ButterworthFilter, spectrum::welch};
//!
//! // 2 Hz sine sampled at 100 Hz
//! let signal: Vec<f64> = (0..400)
//!     .map(|i| (2.0 * std::f64::consts::PI * 2.0 * i as f64 / 100.0).sin())
//!     .collect();
//!
//! let lp = ButterworthFilter::lowpass(3, 2.0, 100.0).unwrap();
//! let smoothed = lp.filtfilt(&signal);
//! assert_eq!(smoothed.len(), signal.len());
//!
//! let psd = welch(&signal, 100.0, signal.len()).unwrap();
//! let (freq, _power) = psd.dominant();
//! assert!((freq - 2.0).abs() < 0.3);
//! ```

pub mod filter;
pub mod peaks;
pub mod spectrum;

pub use filter::ButterworthFilter;
pub use peaks::{find_peaks, find_valleys};
pub use spectrum::{welch, PowerSpectrum};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common result type for signal processing operations
pub type Result<T> = std::result::Result<T, SignalError>;

/// Unified error type for signal processing operations
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Filter design failed (invalid order or cutoff)
    #[error("Filter design error: {0}")]
    FilterDesign(String),

    /// Not enough samples for the requested operation
    #[error("Insufficient samples: need at least {required}, got {available}")]
    InsufficientSamples {
        /// Minimum required samples
        required: usize,
        /// Available samples
        available: usize,
    },

    /// Input data failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SignalError {
    /// Returns `true` if this error is recoverable (retry with more data).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::InsufficientSamples { .. } => true,
            Self::FilterDesign(_) | Self::InvalidInput(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn insufficient_samples_is_recoverable() {
        let err = SignalError::InsufficientSamples {
            required: 16,
            available: 3,
        };
        assert!(err.is_recoverable());
        assert!(!SignalError::FilterDesign("bad order".into()).is_recoverable());
    }
}
