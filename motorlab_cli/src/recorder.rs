//! CSV/JSON persistence for completed runs.
//!
//! Implements the core's `RunRecorder` boundary: one trace CSV per sealed
//! run, plus a summary (CSV, or JSON in `--json` mode) when the whole
//! characterization or sweep finishes.

use std::fs;
use std::path::PathBuf;

use motorlab_core::record::{RunRecord, RunRecorder};

pub struct CsvRecorder {
    out_dir: PathBuf,
    /// File-name prefix, e.g. "duty" or "kp".
    prefix: String,
    json_summary: bool,
}

impl CsvRecorder {
    pub fn new(out_dir: PathBuf, prefix: &str, json_summary: bool) -> eyre::Result<Self> {
        fs::create_dir_all(&out_dir)?;
        Ok(Self {
            out_dir,
            prefix: prefix.to_string(),
            json_summary,
        })
    }

    fn trace_path(&self, parameter: f64) -> PathBuf {
        self.out_dir
            .join(format!("{}_{}.csv", self.prefix, fmt_param(parameter)))
    }
}

/// File-name-safe rendering of a parameter value: integers stay integers,
/// fractions swap the dot for a 'p' (12.5 -> "12p5").
fn fmt_param(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}").replace('.', "p")
    }
}

impl RunRecorder for CsvRecorder {
    fn record_run(
        &mut self,
        record: &RunRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let path = self.trace_path(record.parameter);
        let mut w = csv::Writer::from_path(&path)?;
        let closed_loop = record.series.iter().any(|p| p.extra.is_some());
        if closed_loop {
            w.write_record(["t", "position", "reference", "error", "control"])?;
            for p in &record.series {
                let (reference, error, control) = p
                    .extra
                    .map(|x| (x.reference, x.error, x.control))
                    .unwrap_or((0.0, 0.0, 0.0));
                w.write_record([
                    p.t.to_string(),
                    p.value.to_string(),
                    reference.to_string(),
                    error.to_string(),
                    control.to_string(),
                ])?;
            }
        } else {
            w.write_record(["t", "velocity"])?;
            for p in &record.series {
                w.write_record([p.t.to_string(), p.value.to_string()])?;
            }
        }
        w.flush()?;
        tracing::info!(
            parameter = record.parameter,
            samples = record.series.len(),
            path = %path.display(),
            "trace written"
        );
        Ok(())
    }

    fn finalize(
        &mut self,
        results: &[RunRecord],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.json_summary {
            let rows: Vec<serde_json::Value> = results.iter().map(summary_json).collect();
            let path = self.out_dir.join("summary.json");
            fs::write(&path, serde_json::to_string_pretty(&rows)?)?;
            tracing::info!(path = %path.display(), runs = results.len(), "summary written");
        } else {
            let path = self.out_dir.join("summary.csv");
            let mut w = csv::Writer::from_path(&path)?;
            w.write_record([
                "parameter",
                "samples",
                "termination",
                "tau_s",
                "gain",
                "steady_velocity",
                "rise_time_s",
                "overshoot_pct",
                "settling_time_s",
                "steady_state_error",
            ])?;
            for r in results {
                w.write_record([
                    r.parameter.to_string(),
                    r.series.len().to_string(),
                    r.termination.as_str().to_string(),
                    opt(r.plant.map(|p| p.tau_s)),
                    opt(r.plant.map(|p| p.gain)),
                    opt(r.plant.map(|p| p.steady_velocity)),
                    opt(r.metrics.and_then(|m| m.rise_time_s)),
                    opt(r.metrics.map(|m| m.overshoot_pct)),
                    opt(r.metrics.map(|m| m.settling_time_s)),
                    opt(r.metrics.map(|m| m.steady_state_error)),
                ])?;
            }
            w.flush()?;
            tracing::info!(path = %path.display(), runs = results.len(), "summary written");
        }
        Ok(())
    }
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One summary row as JSON; absent fits/metrics stay null.
pub fn summary_json(r: &RunRecord) -> serde_json::Value {
    serde_json::json!({
        "parameter": r.parameter,
        "samples": r.series.len(),
        "termination": r.termination.as_str(),
        "plant": r.plant.map(|p| serde_json::json!({
            "tau_s": p.tau_s,
            "gain": p.gain,
            "steady_velocity": p.steady_velocity,
        })),
        "metrics": r.metrics.map(|m| serde_json::json!({
            "rise_time_s": m.rise_time_s,
            "overshoot_pct": m.overshoot_pct,
            "settling_time_s": m.settling_time_s,
            "steady_state_error": m.steady_state_error,
        })),
    })
}
