//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured result output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "motorlab",
    version,
    about = "Motor characterization and gain tuning over a serial telemetry link"
)]
pub struct Cli {
    /// Path to config TOML (all sections optional)
    #[arg(long, value_name = "FILE", default_value = "etc/motorlab.toml")]
    pub config: PathBuf,

    /// Serial port override (falls back to config; without the `serial`
    /// feature the simulated link is used)
    #[arg(long, value_name = "PORT")]
    pub port: Option<String>,

    /// Log as JSON lines and emit the final results as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Which PID gain a sweep drives.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SweepAxisArg {
    /// Sweep the proportional gain (Ki = Kd = 0)
    Kp,
    /// Sweep the derivative gain with the configured fixed Kp
    Kd,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the automated step-response characterization over a duty list
    Characterize {
        /// Comma-separated duty overrides (defaults to config)
        #[arg(long, value_name = "LIST", value_delimiter = ',')]
        duties: Option<Vec<i32>>,

        /// Directory for per-run traces and the summary
        #[arg(long, value_name = "DIR", default_value = "data")]
        out: PathBuf,
    },
    /// Sweep a controller gain, one bounded step test per candidate
    Sweep {
        /// Which gain to sweep
        #[arg(long, value_enum)]
        axis: SweepAxisArg,

        /// Comma-separated gain overrides (defaults to config)
        #[arg(long, value_name = "LIST", value_delimiter = ',')]
        gains: Option<Vec<f64>>,

        /// Load gain candidates from a one-column CSV (header `gain`)
        #[arg(long, value_name = "FILE", conflicts_with = "gains")]
        gains_csv: Option<PathBuf>,

        /// Step target override, degrees
        #[arg(long, value_name = "DEG")]
        target: Option<f64>,

        /// Directory for per-run traces and the summary
        #[arg(long, value_name = "DIR", default_value = "data")]
        out: PathBuf,
    },
}
