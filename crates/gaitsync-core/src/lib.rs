//! Gait-synchronized prosthetic arm control core.
//!
//! Estimates walking cadence from a streaming accelerometer-magnitude
//! signal and synthesizes smooth joint-angle setpoints phase-matched to
//! the gait cycle. The per-sample loop is single threaded and allocation
//! light; sensors, motor controllers, GUIs, and model training live behind
//! the [`traits`] seam.
//!
//! # Architecture
//!
//! One control cycle runs four stages:
//!
//! 1. [`window::SampleWindow`] — bounded FIFO over the magnitude stream.
//! 2. [`classifier::ActivityClassifier`] — spectral features plus a k-NN
//!    model decide whether the wearer is walking.
//! 3. [`cadence::CadenceTracker`] — step timing by peak tracking (direct)
//!    or dominant frequency (indirect), gated on the walking state.
//! 4. [`trajectory::TrajectoryGenerator`] — the next joint setpoint, by
//!    profile lookup or bang-bang spline.
//!
//! [`pipeline::Pipeline`] wires the stages together; [`pipeline::Session`]
//! drives them from a [`traits::SampleSource`] into a
//! [`traits::SetpointSink`] for replay and live runs alike.

pub mod artifact;
pub mod cadence;
pub mod classifier;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod profile;
pub mod traits;
pub mod trajectory;
pub mod types;
pub mod window;

pub use artifact::ClassifierArtifact;
pub use cadence::CadenceTracker;
pub use classifier::ActivityClassifier;
pub use config::{CadenceMethod, JointCalibration, PipelineConfig, SpeedCalibration};
pub use error::{CoreError, Result};
pub use pipeline::{Pipeline, Session, SessionSummary, StopCondition};
pub use profile::{GaitProfile, GaitProfileSet};
pub use trajectory::{LookupTableTrajectory, SplineTrajectory, TrajectoryGenerator};
pub use types::{ActivityState, CadenceEstimate, Setpoint};
pub use window::SampleWindow;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used types, re-exported in one place.
pub mod prelude {
    pub use crate::artifact::ClassifierArtifact;
    pub use crate::cadence::CadenceTracker;
    pub use crate::classifier::ActivityClassifier;
    pub use crate::config::{
        CadenceMethod, JointCalibration, PipelineConfig, SpeedCalibration,
    };
    pub use crate::error::{CoreError, Result};
    pub use crate::pipeline::{Pipeline, Session, SessionSummary, StopCondition};
    pub use crate::profile::{GaitProfile, GaitProfileSet};
    pub use crate::traits::{
        NullSink, RecordingSink, ReplaySource, SampleSource, SetpointSink,
    };
    pub use crate::trajectory::{
        LookupTableTrajectory, SplineTrajectory, TrajectoryGenerator,
    };
    pub use crate::types::{ActivityState, CadenceEstimate, Setpoint};
    pub use crate::window::SampleWindow;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
