//! Step-response experiment sequencing.
//!
//! Drives one open-loop run per duty value without operator intervention:
//! apply the duty, wait for the velocity to flatten, cut the drive, wait for
//! the shaft to stop, seal the trace, move on. All timing goes through the
//! injected [`Clock`], so the whole machine runs deterministically in tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use motorlab_traits::{Clock, MonotonicClock, Transport};

use crate::command::Command;
use crate::config::ExperimentCfg;
use crate::error::{Report, Result, TuneError};
use crate::plant;
use crate::record::{Announcement, RunRecord, RunRecorder, Termination, TracePoint};
use crate::telemetry::{self, TelemetryEvent};
use crate::util::ms_to_s;
use crate::velocity::AngleVelocityEstimator;
use crate::window::WindowDetector;

/// Where the sequencer currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentState {
    Idle,
    StartRun,
    WaitSteady,
    WaitStop,
    Finished,
}

/// Public status of one driving-loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentStatus {
    Running,
    Finished,
}

/// Outcome of a full characterization: sealed runs keyed by duty value.
/// Runs sealed before a cancellation are preserved.
#[derive(Debug)]
pub struct CharacterizationOutcome {
    pub results: BTreeMap<i32, RunRecord>,
    pub cancelled: bool,
}

/// The experiment state machine of the characterization rig.
///
/// Exactly one run is in progress whenever the machine is neither `Idle` nor
/// `Finished`; `results` only gains entries on the WaitStop exit transition.
pub struct Characterization<T: Transport, R: RunRecorder> {
    transport: T,
    recorder: R,
    cfg: ExperimentCfg,
    clock: Arc<dyn Clock + Send + Sync>,
    state: ExperimentState,
    index: usize,
    estimator: AngleVelocityEstimator,
    steady: WindowDetector,
    stop: WindowDetector,
    run_epoch: Instant,
    series: Vec<TracePoint>,
    /// Series length at the moment the drive was cut; the first-order fit
    /// only sees the rise, not the coast-down.
    cut_index: Option<usize>,
    announcements: Vec<Announcement>,
    results: BTreeMap<i32, RunRecord>,
    finalized: bool,
}

impl<T: Transport, R: RunRecorder> Characterization<T, R> {
    pub fn new(transport: T, recorder: R, cfg: ExperimentCfg) -> Result<Self> {
        Self::with_clock(transport, recorder, cfg, Arc::new(MonotonicClock::new()))
    }

    /// Build with an explicit clock (deterministic time in tests).
    pub fn with_clock(
        transport: T,
        recorder: R,
        cfg: ExperimentCfg,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self> {
        if cfg.duty_values.is_empty() {
            return Err(Report::new(TuneError::Config(
                "duty_values must not be empty",
            )));
        }
        if cfg.steady.window == 0 || cfg.stop.window == 0 {
            return Err(Report::new(TuneError::Config(
                "detector windows must be >= 1",
            )));
        }
        if !(cfg.steady.threshold > 0.0) || !(cfg.stop.threshold > 0.0) {
            return Err(Report::new(TuneError::Config(
                "detector thresholds must be > 0",
            )));
        }
        let steady = WindowDetector::steady(cfg.steady.window, cfg.steady.threshold);
        let stop = WindowDetector::stop(cfg.stop.window, cfg.stop.threshold);
        let run_epoch = clock.now();
        Ok(Self {
            transport,
            recorder,
            cfg,
            clock,
            state: ExperimentState::Idle,
            index: 0,
            estimator: AngleVelocityEstimator::new(),
            steady,
            stop,
            run_epoch,
            series: Vec::new(),
            cut_index: None,
            announcements: Vec::new(),
            results: BTreeMap::new(),
            finalized: false,
        })
    }

    pub fn state(&self) -> ExperimentState {
        self.state
    }

    pub fn results(&self) -> &BTreeMap<i32, RunRecord> {
        &self.results
    }

    /// Access the underlying transport (e.g. to inspect a mock's command log).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Access the recorder.
    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    /// Drain every complete line currently available, feed each through the
    /// estimator and the active detector, then evaluate the transition table
    /// once.
    pub fn tick(&mut self) -> Result<ExperimentStatus> {
        self.ingest()?;
        self.advance()
    }

    /// Drive to completion on the configured poll cadence. `cancel` is
    /// checked between iterations; on cancellation the motor is commanded
    /// neutral and already-sealed runs are returned intact.
    pub fn run(
        &mut self,
        cancel: Option<Box<dyn Fn() -> bool>>,
    ) -> Result<CharacterizationOutcome> {
        let poll = Duration::from_millis(self.cfg.poll_ms);
        loop {
            if cancel.as_ref().is_some_and(|c| c()) {
                tracing::warn!("cancellation requested, stopping motor");
                self.send_neutral_best_effort();
                return Ok(CharacterizationOutcome {
                    results: std::mem::take(&mut self.results),
                    cancelled: true,
                });
            }
            match self.tick()? {
                ExperimentStatus::Running => self.clock.sleep(poll),
                ExperimentStatus::Finished => {
                    // Leave the rig de-energized.
                    self.send_neutral_best_effort();
                    return Ok(CharacterizationOutcome {
                        results: std::mem::take(&mut self.results),
                        cancelled: false,
                    });
                }
            }
        }
    }

    fn ingest(&mut self) -> Result<()> {
        let lines = match self.transport.drain_lines() {
            Ok(lines) => lines,
            Err(e) => {
                self.send_neutral_best_effort();
                return Err(Report::new(TuneError::Transport(e.to_string())));
            }
        };
        let collecting = matches!(
            self.state,
            ExperimentState::WaitSteady | ExperimentState::WaitStop
        );
        for line in lines {
            match telemetry::decode_line(&line) {
                TelemetryEvent::Angle { degrees } => {
                    if !collecting {
                        continue;
                    }
                    let t = ms_to_s(self.clock.ms_since(self.run_epoch));
                    if let Some(sample) = self.estimator.observe(degrees, t) {
                        self.accept(sample.t, sample.value);
                    }
                }
                TelemetryEvent::Velocity { t, velocity, .. } => {
                    if collecting {
                        self.accept(t, velocity);
                    }
                }
                TelemetryEvent::Tau { duty, t, tau_s } => {
                    tracing::info!(duty, tau_s, "device announced tau");
                    self.announcements.push(Announcement::Tau { duty, t, tau_s });
                }
                TelemetryEvent::Gain {
                    duty,
                    t,
                    k,
                    steady_velocity,
                } => {
                    tracing::info!(duty, k, steady_velocity, "device announced gain");
                    self.announcements.push(Announcement::Gain {
                        duty,
                        t,
                        k,
                        steady_velocity,
                    });
                }
                TelemetryEvent::Task { label } => {
                    tracing::info!(%label, "task banner");
                }
                // Closed-loop telemetry has no place in an open-loop run.
                TelemetryEvent::Loop { .. } => {}
                TelemetryEvent::Unrecognized { raw } => {
                    tracing::trace!(line = %raw, "unrecognized line dropped");
                }
            }
        }
        Ok(())
    }

    fn accept(&mut self, t: f64, velocity: f64) {
        self.series.push(TracePoint::new(t, velocity));
        match self.state {
            ExperimentState::WaitSteady => self.steady.push(velocity),
            ExperimentState::WaitStop => self.stop.push(velocity),
            _ => {}
        }
    }

    fn advance(&mut self) -> Result<ExperimentStatus> {
        match self.state {
            ExperimentState::Idle => {
                self.state = ExperimentState::StartRun;
                Ok(ExperimentStatus::Running)
            }
            ExperimentState::StartRun => {
                if self.index >= self.cfg.duty_values.len() {
                    self.state = ExperimentState::Finished;
                    if !self.finalized {
                        self.finalized = true;
                        let ordered: Vec<RunRecord> = self.results.values().cloned().collect();
                        self.recorder
                            .finalize(&ordered)
                            .map_err(|e| Report::new(TuneError::Recorder(e.to_string())))?;
                    }
                    return Ok(ExperimentStatus::Finished);
                }
                let duty = self.cfg.duty_values[self.index];
                tracing::info!(
                    duty,
                    run = self.index + 1,
                    total = self.cfg.duty_values.len(),
                    "starting run"
                );
                self.estimator.reset();
                self.steady.clear();
                self.stop.clear();
                self.series.clear();
                self.cut_index = None;
                self.announcements.clear();
                self.run_epoch = self.clock.now();
                self.send(Command::Duty(duty))?;
                self.state = ExperimentState::WaitSteady;
                Ok(ExperimentStatus::Running)
            }
            ExperimentState::WaitSteady => {
                if self.steady.is_satisfied() {
                    tracing::info!(
                        duty = self.cfg.duty_values[self.index],
                        samples = self.series.len(),
                        "steady state reached, cutting drive"
                    );
                    self.cut_index = Some(self.series.len());
                    self.send(Command::Duty(0))?;
                    self.stop.clear();
                    self.state = ExperimentState::WaitStop;
                }
                Ok(ExperimentStatus::Running)
            }
            ExperimentState::WaitStop => {
                if self.stop.is_satisfied() {
                    self.seal_current()?;
                    self.index += 1;
                    // Wall-clock pacing between runs, not a sample-driven wait.
                    self.clock
                        .sleep(Duration::from_millis(self.cfg.settle_ms));
                    self.state = ExperimentState::StartRun;
                }
                Ok(ExperimentStatus::Running)
            }
            ExperimentState::Finished => Ok(ExperimentStatus::Finished),
        }
    }

    fn seal_current(&mut self) -> Result<()> {
        let duty = self.cfg.duty_values[self.index];
        let series = std::mem::take(&mut self.series);
        let announcements = std::mem::take(&mut self.announcements);
        let rise_end = self.cut_index.take().unwrap_or(series.len());
        let fit = plant::fit_first_order(
            &series[..rise_end],
            f64::from(duty),
            self.cfg.steady.window,
        );
        let record = RunRecord {
            parameter: f64::from(duty),
            series,
            announcements,
            termination: Termination::SteadyStateReached,
            plant: fit,
            metrics: None,
        };
        tracing::info!(duty, samples = record.series.len(), "run sealed");
        self.recorder
            .record_run(&record)
            .map_err(|e| Report::new(TuneError::Recorder(e.to_string())))?;
        self.results.insert(duty, record);
        Ok(())
    }

    fn send(&mut self, cmd: Command) -> Result<()> {
        tracing::debug!(%cmd, "send");
        if let Err(e) = self.transport.write_line(&cmd.to_string()) {
            // Best-effort neutral before surfacing the fault.
            self.send_neutral_best_effort();
            return Err(Report::new(TuneError::Transport(e.to_string())));
        }
        Ok(())
    }

    fn send_neutral_best_effort(&mut self) {
        if let Err(e) = self.transport.write_line(&Command::Duty(0).to_string()) {
            tracing::warn!(error = %e, "neutral command failed");
        }
    }
}
