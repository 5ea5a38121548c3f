#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Closed-loop motor characterization and tuning core (transport-agnostic).
//!
//! Everything hardware-shaped goes through `motorlab_traits::Transport`
//! ("read available complete lines, write a command line"); this crate owns
//! the logic between those two calls:
//!
//! - **Decoding**: noisy telemetry lines → typed events (`telemetry`)
//! - **Estimation**: wrapped angles → angular velocity (`velocity`)
//! - **Detection**: windowed steady-state / stop classifiers (`window`)
//! - **Sequencing**: the per-duty experiment state machine (`experiment`)
//! - **Sweeping**: time-bounded gain trials (`sweep`)
//! - **Metrics**: rise/overshoot/settling/steady-state error (`metrics`)
//! - **Fitting**: first-order τ/K extraction (`plant`)
//!
//! Completed runs leave through the `record::RunRecorder` boundary; file
//! formats and plotting live on the other side of it.

pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod experiment;
pub mod metrics;
pub mod mocks;
pub mod plant;
pub mod record;
pub mod sweep;
pub mod telemetry;
pub mod util;
pub mod velocity;
pub mod window;

pub use command::Command;
pub use config::{DetectorCfg, ExperimentCfg, SweepCfg};
pub use error::{MetricsError, TuneError};
pub use experiment::{
    Characterization, CharacterizationOutcome, ExperimentState, ExperimentStatus,
};
pub use metrics::{StepMetrics, evaluate};
pub use plant::PlantEstimate;
pub use record::{Announcement, LoopSignals, RunRecord, RunRecorder, Termination, TracePoint};
pub use sweep::{GainAxis, GainSweep, SweepOutcome};
pub use telemetry::{TelemetryEvent, decode_line};
pub use velocity::{AngleVelocityEstimator, VelocitySample};
pub use window::{WindowDetector, WindowStat};
