//! Completed-run records and the persistence boundary.

use crate::metrics::StepMetrics;
use crate::plant::PlantEstimate;

/// Why a captured run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The steady-state detector fired and the stop phase completed.
    SteadyStateReached,
    /// An external deadline cut the run short.
    Timeout,
    /// The trial window was fixed up front (gain-sweep trials).
    ExternallyBounded,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::SteadyStateReached => "steady_state",
            Termination::Timeout => "timeout",
            Termination::ExternallyBounded => "bounded",
        }
    }
}

/// Controller-loop signals carried alongside the primary trace in
/// closed-loop trials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSignals {
    pub reference: f64,
    pub error: f64,
    pub control: f64,
}

/// One (t, signal) point of a captured trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    /// Seconds, run-local.
    pub t: f64,
    /// Primary signal: angular velocity (characterization) or position
    /// (gain-sweep trials), degrees-based units.
    pub value: f64,
    pub extra: Option<LoopSignals>,
}

impl TracePoint {
    pub fn new(t: f64, value: f64) -> Self {
        Self {
            t,
            value,
            extra: None,
        }
    }
}

/// Device-side parameter announcements observed during a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Announcement {
    Tau { duty: i32, t: f64, tau_s: f64 },
    Gain {
        duty: i32,
        t: f64,
        k: f64,
        steady_velocity: f64,
    },
}

/// A completed trial: one input value, its captured trajectory, and any
/// post-processing done on it. Owned exclusively by the producing controller
/// until handed to a `RunRecorder`; immutable afterwards.
#[derive(Debug, Clone)]
pub struct RunRecord {
    /// The input value this trial applied (duty or gain).
    pub parameter: f64,
    pub series: Vec<TracePoint>,
    pub announcements: Vec<Announcement>,
    pub termination: Termination,
    /// First-order fit of the velocity trace, when one was possible.
    pub plant: Option<PlantEstimate>,
    /// Step metrics against the trial target, when computable.
    pub metrics: Option<StepMetrics>,
}

/// Persistence/plotting boundary. The core pushes completed runs out through
/// this trait and never touches file formats itself.
pub trait RunRecorder {
    /// Accept one sealed run.
    fn record_run(
        &mut self,
        record: &RunRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Accept the full, ordered result set when a characterization or sweep
    /// completes normally. Called at most once.
    fn finalize(
        &mut self,
        results: &[RunRecord],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
