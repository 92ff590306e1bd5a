//! Collaborator interfaces at the system boundary.
//!
//! The control loop never talks to hardware directly: samples come in
//! through a [`SampleSource`] and commands go out through a
//! [`SetpointSink`], so file replay and live operation share the same
//! per-cycle contract.

use crate::error::Result;
use crate::types::Setpoint;

/// Produces acceleration-magnitude samples, one per control cycle.
pub trait SampleSource {
    /// The next sample, or `None` when the source is exhausted.
    /// Live sources block until a sample arrives and never return `None`.
    fn next_sample(&mut self) -> Option<f64>;
}

/// Consumes the setpoint emitted each control cycle.
pub trait SetpointSink {
    fn emit(&mut self, setpoint: &Setpoint) -> Result<()>;
}

/// Replays a pre-recorded magnitude vector, for software-in-the-loop runs.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    samples: Vec<f64>,
    cursor: usize,
}

impl ReplaySource {
    #[must_use]
    pub fn new(samples: Vec<f64>) -> Self {
        Self { samples, cursor: 0 }
    }

    /// Samples remaining to replay.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.cursor
    }
}

impl SampleSource for ReplaySource {
    fn next_sample(&mut self) -> Option<f64> {
        let sample = self.samples.get(self.cursor).copied();
        if sample.is_some() {
            self.cursor += 1;
        }
        sample
    }
}

/// Discards every setpoint. Useful for timing and smoke runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SetpointSink for NullSink {
    fn emit(&mut self, _setpoint: &Setpoint) -> Result<()> {
        Ok(())
    }
}

/// Records every setpoint for offline inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub setpoints: Vec<Setpoint>,
}

impl SetpointSink for RecordingSink {
    fn emit(&mut self, setpoint: &Setpoint) -> Result<()> {
        self.setpoints.push(*setpoint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_source_drains_in_order() {
        let mut src = ReplaySource::new(vec![1.0, 2.0, 3.0]);
        assert_eq!(src.remaining(), 3);
        assert_eq!(src.next_sample(), Some(1.0));
        assert_eq!(src.next_sample(), Some(2.0));
        assert_eq!(src.next_sample(), Some(3.0));
        assert_eq!(src.next_sample(), None);
        assert_eq!(src.remaining(), 0);
    }

    #[test]
    fn recording_sink_keeps_everything() {
        let mut sink = RecordingSink::default();
        sink.emit(&Setpoint::rest()).unwrap();
        sink.emit(&Setpoint {
            elbow_rev: 0.1,
            shoulder_rev: None,
            cadence_hz: 2.0,
        })
        .unwrap();
        assert_eq!(sink.setpoints.len(), 2);
        assert_eq!(sink.setpoints[1].cadence_hz, 2.0);
    }
}
