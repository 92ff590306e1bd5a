//! Per-sample control cycle and session loops.
//!
//! `Pipeline::process` is the single-threaded inner loop body: append the
//! sample, classify the window, track cadence when walking, generate the
//! next setpoint. `Session` drives that cycle against injected source and
//! sink collaborators until a stop condition is met, so software-in-the-
//! loop replay and live operation run the exact same code.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::cadence::CadenceTracker;
use crate::classifier::ActivityClassifier;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::trajectory::TrajectoryGenerator;
use crate::traits::{SampleSource, SetpointSink};
use crate::types::{CadenceEstimate, Setpoint};
use crate::window::SampleWindow;

/// Counters accumulated across cycles.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleStatistics {
    /// Cycles processed.
    pub cycles: u64,
    /// Cycles that held the previous setpoint (cold start or short window).
    pub held: u64,
    /// Cycles classified as walking.
    pub walking_cycles: u64,
}

/// The assembled control core.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    window: SampleWindow,
    classifier: ActivityClassifier,
    tracker: CadenceTracker,
    generator: TrajectoryGenerator,
    last_setpoint: Setpoint,
    last_cadence: Option<CadenceEstimate>,
    stats: CycleStatistics,
}

impl Pipeline {
    /// Assemble the pipeline. The classifier threshold is overridden by the
    /// configured one so the config stays the single source of truth.
    pub fn new(
        config: PipelineConfig,
        mut classifier: ActivityClassifier,
        generator: TrajectoryGenerator,
    ) -> Result<Self> {
        config.validate()?;
        classifier.set_threshold(config.confidence_threshold);
        let window = SampleWindow::new(config.sample_rate_hz, config.window_duration_s)?;
        let tracker = CadenceTracker::new(
            config.cadence_method,
            config.sample_rate_hz,
            config.cadence_window_s,
            config.stride_history_len,
        )?;
        Ok(Self {
            config,
            window,
            classifier,
            tracker,
            generator,
            last_setpoint: Setpoint::rest(),
            last_cadence: None,
            stats: CycleStatistics::default(),
        })
    }

    /// Run one control cycle on a magnitude sample.
    ///
    /// During cold start, or when a stage reports a recoverable shortage of
    /// data, the previous setpoint is held rather than surfacing an error.
    pub fn process(&mut self, magnitude: f64) -> Result<Setpoint> {
        self.window.append(magnitude);
        self.stats.cycles += 1;

        let Some(class_slice) = self.window.latest(self.config.classifier_window_s) else {
            return Ok(self.hold());
        };
        match self
            .classifier
            .predict(&class_slice, self.config.sample_rate_hz)
        {
            Ok(_) => {}
            Err(e) if e.is_recoverable() => return Ok(self.hold()),
            Err(e) => return Err(e),
        }
        let walking = self.classifier.walking();
        if walking {
            self.stats.walking_cycles += 1;
        }

        let Some(cadence_slice) = self.window.latest(self.config.cadence_window_s) else {
            return Ok(self.hold());
        };
        let cadence = match self.tracker.measure(&cadence_slice, walking) {
            Ok(c) => c,
            Err(e) if e.is_recoverable() => return Ok(self.hold()),
            Err(e) => return Err(e),
        };
        self.last_cadence = Some(cadence);

        let (elbow, shoulder) = self
            .generator
            .setpoint(&cadence, self.config.cadence_window_s);
        // The commanded angle is the best available device-state estimate
        // until an encoder feeds one back
        self.generator.set_angle(elbow);
        if let Some(sh) = shoulder {
            self.generator.set_shoulder_angle(sh);
        }

        let cadence_hz = if cadence.is_walking() {
            cadence.steps_per_window / self.config.cadence_window_s
        } else {
            0.0
        };
        let setpoint = Setpoint {
            elbow_rev: elbow,
            shoulder_rev: shoulder,
            cadence_hz,
        };
        self.last_setpoint = setpoint;
        Ok(setpoint)
    }

    /// Run one control cycle on a raw three-axis reading.
    pub fn process_xyz(&mut self, x: f64, y: f64, z: f64) -> Result<Setpoint> {
        self.process((x * x + y * y + z * z).sqrt())
    }

    fn hold(&mut self) -> Setpoint {
        self.stats.held += 1;
        debug!(cycle = self.stats.cycles, "holding previous setpoint");
        self.last_setpoint
    }

    /// Most recent cadence estimate, once one exists.
    #[must_use]
    pub fn last_cadence(&self) -> Option<&CadenceEstimate> {
        self.last_cadence.as_ref()
    }

    #[must_use]
    pub fn last_setpoint(&self) -> Setpoint {
        self.last_setpoint
    }

    #[must_use]
    pub fn statistics(&self) -> CycleStatistics {
        self.stats
    }

    #[must_use]
    pub fn classifier(&self) -> &ActivityClassifier {
        &self.classifier
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

/// When a session loop ends.
#[derive(Debug, Clone, Copy)]
pub enum StopCondition {
    /// Stop after this many cycles.
    Cycles(u64),
    /// Stop after this much wall-clock time.
    Duration(Duration),
    /// Run until the source returns `None`.
    Exhausted,
}

/// Summary returned when a session ends.
#[derive(Debug, Clone, Copy)]
pub struct SessionSummary {
    pub cycles: u64,
    pub held: u64,
    pub walking_cycles: u64,
    pub final_setpoint: Setpoint,
}

/// One run of the pipeline against a source/sink pair.
pub struct Session<S: SampleSource, K: SetpointSink> {
    pipeline: Pipeline,
    source: S,
    sink: K,
    stop: StopCondition,
}

impl<S: SampleSource, K: SetpointSink> Session<S, K> {
    pub fn new(pipeline: Pipeline, source: S, sink: K, stop: StopCondition) -> Self {
        Self {
            pipeline,
            source,
            sink,
            stop,
        }
    }

    /// Drive cycles until the stop condition or source exhaustion.
    pub fn run(mut self) -> Result<SessionSummary> {
        info!(stop = ?self.stop, "session started");
        let started = Instant::now();
        let mut cycles = 0u64;

        loop {
            match self.stop {
                StopCondition::Cycles(n) if cycles >= n => break,
                StopCondition::Duration(d) if started.elapsed() >= d => break,
                _ => {}
            }
            let Some(sample) = self.source.next_sample() else {
                break;
            };
            let setpoint = self.pipeline.process(sample)?;
            self.sink.emit(&setpoint)?;
            cycles += 1;
        }

        let stats = self.pipeline.statistics();
        info!(
            cycles,
            held = stats.held,
            walking = stats.walking_cycles,
            "session finished"
        );
        Ok(SessionSummary {
            cycles,
            held: stats.held,
            walking_cycles: stats.walking_cycles,
            final_setpoint: self.pipeline.last_setpoint(),
        })
    }
}
