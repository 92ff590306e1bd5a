//! Error types for the control core.

use gaitsync_signal::SignalError;

/// Common result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Unified error type for the control core
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Classifier artifact failed to load or validate
    #[error("Classifier artifact error: {0}")]
    Artifact(String),

    /// Gait profile file missing or malformed
    #[error("Gait profile error: {0}")]
    Profile(String),

    /// Signal processing failed
    #[error("Signal processing error: {0}")]
    Signal(#[from] SignalError),

    /// I/O failure while loading artifacts or profiles
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization or deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an artifact error
    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    /// Create a profile error
    pub fn profile(msg: impl Into<String>) -> Self {
        Self::Profile(msg.into())
    }

    /// Returns `true` if the operation can be retried once more data has
    /// been collected. Construction errors are never recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Signal(err) => err.is_recoverable(),
            _ => false,
        }
    }
}
