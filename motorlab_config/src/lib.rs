#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the characterization rig.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - A strict-header CSV loader reads gain candidate lists for sweeps.

use serde::Deserialize;

/// Gain-list CSV schema.
///
/// Expected headers:
/// gain
///
/// Example:
/// gain
/// 1
/// 5
/// 50
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct GainRow {
    pub gain: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SerialCfg {
    /// Serial device path (e.g. /dev/ttyUSB0 or COM4). When absent, the CLI
    /// falls back to the simulated link.
    pub port: Option<String>,
    pub baud: u32,
}

impl Default for SerialCfg {
    fn default() -> Self {
        Self {
            port: None,
            baud: 115_200,
        }
    }
}

/// Step-response characterization settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExperimentCfg {
    /// Duty values to test, one run each, in order.
    pub duty_values: Vec<i32>,
    /// Steady once the velocity std-dev over the window is below this (deg/s).
    pub steady_threshold: f64,
    pub steady_window: usize,
    /// Stopped once mean |velocity| over the window is below this (deg/s).
    pub stop_threshold: f64,
    pub stop_window: usize,
    /// Driving-loop poll interval, ms.
    pub poll_ms: u64,
    /// Pause between runs, ms.
    pub settle_ms: u64,
}

impl Default for ExperimentCfg {
    fn default() -> Self {
        Self {
            duty_values: vec![150, 175, 200, 225, 250],
            steady_threshold: 2.0,
            steady_window: 25,
            stop_threshold: 1.0,
            stop_window: 25,
            poll_ms: 50,
            settle_ms: 1_000,
        }
    }
}

/// Gain-sweep settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SweepCfg {
    /// Step target, degrees.
    pub target_deg: f64,
    /// Data-collection window per trial, ms.
    pub test_duration_ms: u64,
    /// Poll interval while collecting, ms.
    pub poll_ms: u64,
    /// Kp candidates for `sweep --axis kp`.
    pub kp_values: Vec<f64>,
    /// Kd candidates for `sweep --axis kd`.
    pub kd_values: Vec<f64>,
    /// Proportional gain held fixed during a Kd sweep.
    pub fixed_kp: f64,
    pub stop_settle_ms: u64,
    pub zero_settle_ms: u64,
    pub gain_settle_ms: u64,
    pub return_settle_ms: u64,
}

impl Default for SweepCfg {
    fn default() -> Self {
        Self {
            target_deg: 200.0,
            test_duration_ms: 2_000,
            poll_ms: 10,
            kp_values: vec![
                1.0, 5.0, 10.0, 30.0, 50.0, 80.0, 100.0, 150.0, 200.0, 300.0, 500.0, 800.0,
                1_000.0,
            ],
            kd_values: vec![
                0.0, 1.0, 3.0, 5.0, 8.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0,
            ],
            fixed_kp: 50.0,
            stop_settle_ms: 100,
            zero_settle_ms: 500,
            gain_settle_ms: 100,
            return_settle_ms: 1_500,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub serial: SerialCfg,
    pub experiment: ExperimentCfg,
    pub sweep: SweepCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Experiment
        if self.experiment.duty_values.is_empty() {
            eyre::bail!("experiment.duty_values must not be empty");
        }
        if self.experiment.steady_window == 0 {
            eyre::bail!("experiment.steady_window must be >= 1");
        }
        if self.experiment.stop_window == 0 {
            eyre::bail!("experiment.stop_window must be >= 1");
        }
        if !(self.experiment.steady_threshold > 0.0) {
            eyre::bail!("experiment.steady_threshold must be > 0");
        }
        if !(self.experiment.stop_threshold > 0.0) {
            eyre::bail!("experiment.stop_threshold must be > 0");
        }
        if self.experiment.poll_ms == 0 {
            eyre::bail!("experiment.poll_ms must be >= 1");
        }
        if self.experiment.settle_ms > 5 * 60 * 1000 {
            eyre::bail!("experiment.settle_ms is unreasonably large (>5min)");
        }

        // Sweep
        if !(self.sweep.target_deg > 0.0) {
            eyre::bail!("sweep.target_deg must be > 0");
        }
        if self.sweep.test_duration_ms == 0 {
            eyre::bail!("sweep.test_duration_ms must be >= 1");
        }
        if self.sweep.poll_ms == 0 {
            eyre::bail!("sweep.poll_ms must be >= 1");
        }
        if !(self.sweep.fixed_kp >= 0.0) {
            eyre::bail!("sweep.fixed_kp must be >= 0");
        }
        for (name, values) in [
            ("sweep.kp_values", &self.sweep.kp_values),
            ("sweep.kd_values", &self.sweep.kd_values),
        ] {
            for v in values {
                if !v.is_finite() || *v < 0.0 {
                    eyre::bail!("{name} entries must be finite and >= 0");
                }
            }
        }

        // Serial
        if self.serial.baud == 0 {
            eyre::bail!("serial.baud must be > 0");
        }

        Ok(())
    }
}

/// Load a gain candidate list from a one-column CSV with the exact header
/// `gain`. Rejects malformed rows, non-finite or negative values, and an
/// empty list.
pub fn load_gains_csv(path: &std::path::Path) -> eyre::Result<Vec<f64>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open gains CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != ["gain"] {
        eyre::bail!(
            "gains CSV must have the single header 'gain', got: {}",
            actual.join(",")
        );
    }

    let mut gains = Vec::new();
    for (idx, rec) in rdr.deserialize::<GainRow>().enumerate() {
        match rec {
            Ok(row) => {
                if !row.gain.is_finite() || row.gain < 0.0 {
                    eyre::bail!("invalid gain at CSV row {}: {}", idx + 2, row.gain);
                }
                gains.push(row.gain);
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    if gains.is_empty() {
        eyre::bail!("gains CSV contains no values");
    }
    Ok(gains)
}
