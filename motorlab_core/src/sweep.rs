//! Bounded gain-sweep trials.
//!
//! For each candidate gain: reset the controller, apply the value, run one
//! fixed-duration closed-loop step test, record the trajectory. Termination
//! is purely by elapsed time — no steady-state detection — trading
//! measurement elegance for a predictable total sweep duration. A value
//! that never settles still produces a record.

use std::sync::Arc;
use std::time::Duration;

use motorlab_traits::{Clock, MonotonicClock, Transport};

use crate::command::Command;
use crate::config::SweepCfg;
use crate::error::{MetricsError, Report, Result, TuneError};
use crate::metrics;
use crate::record::{LoopSignals, RunRecord, RunRecorder, Termination, TracePoint};
use crate::telemetry::{self, TelemetryEvent};

/// Which PID gain the swept value lands in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GainAxis {
    /// Sweep the proportional gain; Ki = Kd = 0.
    Kp,
    /// Sweep the derivative gain with a fixed proportional gain.
    Kd { fixed_kp: f64 },
}

impl GainAxis {
    /// The (Kp, Ki, Kd) triple a swept value maps to.
    pub fn gains_for(&self, value: f64) -> (f64, f64, f64) {
        match *self {
            GainAxis::Kp => (value, 0.0, 0.0),
            GainAxis::Kd { fixed_kp } => (fixed_kp, 0.0, value),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GainAxis::Kp => "Kp",
            GainAxis::Kd { .. } => "Kd",
        }
    }
}

/// Outcome of a sweep: one record per completed trial, in sweep order.
#[derive(Debug)]
pub struct SweepOutcome {
    pub records: Vec<RunRecord>,
    pub cancelled: bool,
}

/// Time-bounded gain-sweep driver.
pub struct GainSweep<T: Transport, R: RunRecorder> {
    transport: T,
    recorder: R,
    values: Vec<f64>,
    axis: GainAxis,
    cfg: SweepCfg,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl<T: Transport, R: RunRecorder> GainSweep<T, R> {
    pub fn new(
        transport: T,
        recorder: R,
        values: Vec<f64>,
        axis: GainAxis,
        cfg: SweepCfg,
    ) -> Result<Self> {
        Self::with_clock(
            transport,
            recorder,
            values,
            axis,
            cfg,
            Arc::new(MonotonicClock::new()),
        )
    }

    /// Build with an explicit clock (deterministic time in tests).
    pub fn with_clock(
        transport: T,
        recorder: R,
        values: Vec<f64>,
        axis: GainAxis,
        cfg: SweepCfg,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Result<Self> {
        if !(cfg.target > 0.0) {
            return Err(Report::new(TuneError::Config("sweep target must be > 0")));
        }
        if cfg.test_duration_ms == 0 {
            return Err(Report::new(TuneError::Config(
                "test_duration_ms must be >= 1",
            )));
        }
        Ok(Self {
            transport,
            recorder,
            values,
            axis,
            cfg,
            clock,
        })
    }

    /// Access the underlying transport (e.g. to inspect a mock's command log).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Access the recorder.
    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    /// Run every trial in order. An empty candidate list performs zero
    /// transport writes and emits zero records.
    pub fn run(&mut self, cancel: Option<Box<dyn Fn() -> bool>>) -> Result<SweepOutcome> {
        if self.values.is_empty() {
            tracing::warn!("empty gain list, nothing to sweep");
            return Ok(SweepOutcome {
                records: Vec::new(),
                cancelled: false,
            });
        }
        let values = self.values.clone();
        let mut records = Vec::with_capacity(values.len());
        for (i, &value) in values.iter().enumerate() {
            if cancel.as_ref().is_some_and(|c| c()) {
                tracing::warn!("cancellation requested, stopping controller");
                self.send_stop_best_effort();
                return Ok(SweepOutcome {
                    records,
                    cancelled: true,
                });
            }
            tracing::info!(
                axis = self.axis.label(),
                value,
                trial = i + 1,
                total = values.len(),
                "gain trial"
            );
            match self.run_trial(value, cancel.as_deref())? {
                Some(record) => records.push(record),
                // Cancelled mid-trial; the partial trial is discarded.
                None => {
                    return Ok(SweepOutcome {
                        records,
                        cancelled: true,
                    });
                }
            }
        }
        self.send(Command::Stop)?;
        self.recorder
            .finalize(&records)
            .map_err(|e| Report::new(TuneError::Recorder(e.to_string())))?;
        Ok(SweepOutcome {
            records,
            cancelled: false,
        })
    }

    /// One bounded step trial. Returns None when cancelled mid-collection.
    fn run_trial(
        &mut self,
        value: f64,
        cancel: Option<&(dyn Fn() -> bool)>,
    ) -> Result<Option<RunRecord>> {
        let (kp, ki, kd) = self.axis.gains_for(value);

        self.send(Command::Stop)?;
        self.clock
            .sleep(Duration::from_millis(self.cfg.stop_settle_ms));
        self.send(Command::Zero)?;
        self.clock
            .sleep(Duration::from_millis(self.cfg.zero_settle_ms));
        self.send(Command::Gains { kp, ki, kd })?;
        self.clock
            .sleep(Duration::from_millis(self.cfg.gain_settle_ms));

        // Stale telemetry from the reset would pollute the trace.
        if let Err(e) = self.transport.clear_input() {
            self.send_stop_best_effort();
            return Err(Report::new(TuneError::Transport(e.to_string())));
        }
        self.send(Command::MoveTo(self.cfg.target))?;

        let epoch = self.clock.now();
        let poll = Duration::from_millis(self.cfg.poll_ms);
        let mut series: Vec<TracePoint> = Vec::new();
        loop {
            if cancel.is_some_and(|c| c()) {
                self.send_stop_best_effort();
                return Ok(None);
            }
            let lines = match self.transport.drain_lines() {
                Ok(lines) => lines,
                Err(e) => {
                    self.send_stop_best_effort();
                    return Err(Report::new(TuneError::Transport(e.to_string())));
                }
            };
            for line in lines {
                match telemetry::decode_line(&line) {
                    TelemetryEvent::Loop {
                        t,
                        position,
                        reference,
                        error,
                        control,
                    } => series.push(TracePoint {
                        t,
                        value: position,
                        extra: Some(LoopSignals {
                            reference,
                            error,
                            control,
                        }),
                    }),
                    other => tracing::trace!(?other, "non-loop line during trial"),
                }
            }
            if self.clock.ms_since(epoch) >= self.cfg.test_duration_ms {
                break;
            }
            self.clock.sleep(poll);
        }

        self.send(Command::MoveTo(0.0))?;
        self.clock
            .sleep(Duration::from_millis(self.cfg.return_settle_ms));

        let t: Vec<f64> = series.iter().map(|p| p.t).collect();
        let y: Vec<f64> = series.iter().map(|p| p.value).collect();
        let step_metrics = match metrics::evaluate(&t, &y, self.cfg.target) {
            Ok(m) => Some(m),
            Err(MetricsError::EmptySeries) => {
                tracing::warn!(value, "trial produced no samples");
                None
            }
            Err(e) => return Err(Report::new(e)),
        };

        let record = RunRecord {
            parameter: value,
            series,
            announcements: Vec::new(),
            termination: Termination::ExternallyBounded,
            plant: None,
            metrics: step_metrics,
        };
        tracing::info!(
            value,
            samples = record.series.len(),
            "trial recorded"
        );
        self.recorder
            .record_run(&record)
            .map_err(|e| Report::new(TuneError::Recorder(e.to_string())))?;
        Ok(Some(record))
    }

    fn send(&mut self, cmd: Command) -> Result<()> {
        tracing::debug!(%cmd, "send");
        if let Err(e) = self.transport.write_line(&cmd.to_string()) {
            self.send_stop_best_effort();
            return Err(Report::new(TuneError::Transport(e.to_string())));
        }
        Ok(())
    }

    fn send_stop_best_effort(&mut self) {
        if let Err(e) = self.transport.write_line(&Command::Stop.to_string()) {
            tracing::warn!(error = %e, "stop command failed");
        }
    }
}
