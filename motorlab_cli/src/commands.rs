//! Experiment execution: config mapping, transport assembly, result output.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::WrapErr;
use motorlab_core::{Characterization, GainAxis, GainSweep, RunRecord};
use motorlab_traits::Transport;
use motorlab_transport::SimMode;

use crate::cli::SweepAxisArg;
use crate::recorder::{CsvRecorder, summary_json};

/// Install the ctrl-c handler and hand back the cooperative stop flag.
pub fn shutdown_flag() -> eyre::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = flag.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    })
    .wrap_err("install ctrl-c handler")?;
    Ok(flag)
}

fn cancel_check(flag: &Arc<AtomicBool>) -> Option<Box<dyn Fn() -> bool>> {
    let flag = flag.clone();
    Some(Box::new(move || flag.load(Ordering::Relaxed)))
}

/// Assemble the transport: real serial when the feature and a port are
/// present, simulated plant otherwise.
fn open_transport(
    cfg: &motorlab_config::Config,
    port_override: Option<&str>,
    sim_mode: SimMode,
    sim_dt_ms: u64,
) -> eyre::Result<Box<dyn Transport>> {
    let port = port_override
        .map(str::to_string)
        .or_else(|| cfg.serial.port.clone());

    #[cfg(feature = "serial")]
    if let Some(port) = port {
        tracing::info!(%port, baud = cfg.serial.baud, "opening serial link");
        let link = motorlab_transport::SerialTransport::open(&port, cfg.serial.baud)
            .wrap_err_with(|| format!("open serial port {port}"))?;
        return Ok(Box::new(link));
    }

    #[cfg(not(feature = "serial"))]
    if let Some(port) = port {
        tracing::warn!(%port, "built without the serial feature; using simulated link");
    }

    tracing::info!("using simulated link");
    let dt_s = sim_dt_ms as f64 / 1_000.0;
    Ok(Box::new(motorlab_transport::SimulatedLink::new(
        sim_mode, dt_s,
    )))
}

pub fn run_characterize(
    cfg: &motorlab_config::Config,
    duties: Option<Vec<i32>>,
    out: &Path,
    json: bool,
    port_override: Option<&str>,
    shutdown: &Arc<AtomicBool>,
) -> eyre::Result<()> {
    let mut core_cfg: motorlab_core::ExperimentCfg = (&cfg.experiment).into();
    if let Some(duties) = duties {
        core_cfg.duty_values = duties;
    }

    let transport = open_transport(cfg, port_override, SimMode::Velocity, core_cfg.poll_ms)?;
    let recorder = CsvRecorder::new(out.to_path_buf(), "duty", json)?;
    let mut machine = Characterization::new(transport, recorder, core_cfg)?;

    let outcome = machine.run(cancel_check(shutdown))?;
    if outcome.cancelled {
        tracing::warn!(
            sealed = outcome.results.len(),
            "characterization cancelled; sealed runs kept"
        );
    }
    let records: Vec<RunRecord> = outcome.results.into_values().collect();
    print_results(&records, json);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn run_sweep(
    cfg: &motorlab_config::Config,
    axis: SweepAxisArg,
    gains: Option<Vec<f64>>,
    gains_csv: Option<&Path>,
    target: Option<f64>,
    out: &Path,
    json: bool,
    port_override: Option<&str>,
    shutdown: &Arc<AtomicBool>,
) -> eyre::Result<()> {
    let mut sweep_cfg: motorlab_core::SweepCfg = (&cfg.sweep).into();
    if let Some(target) = target {
        sweep_cfg.target = target;
    }

    let values = match (gains, gains_csv) {
        (Some(values), _) => values,
        (None, Some(path)) => motorlab_config::load_gains_csv(path)?,
        (None, None) => match axis {
            SweepAxisArg::Kp => cfg.sweep.kp_values.clone(),
            SweepAxisArg::Kd => cfg.sweep.kd_values.clone(),
        },
    };
    let (core_axis, prefix) = match axis {
        SweepAxisArg::Kp => (GainAxis::Kp, "kp"),
        SweepAxisArg::Kd => (
            GainAxis::Kd {
                fixed_kp: cfg.sweep.fixed_kp,
            },
            "kd",
        ),
    };

    let transport = open_transport(cfg, port_override, SimMode::Position, sweep_cfg.poll_ms)?;
    let recorder = CsvRecorder::new(out.to_path_buf(), prefix, json)?;
    let mut sweep = GainSweep::new(transport, recorder, values, core_axis, sweep_cfg)?;

    let outcome = sweep.run(cancel_check(shutdown))?;
    if outcome.cancelled {
        tracing::warn!(
            recorded = outcome.records.len(),
            "sweep cancelled; recorded trials kept"
        );
    }
    print_results(&outcome.records, json);
    Ok(())
}

fn print_results(records: &[RunRecord], json: bool) {
    if json {
        let rows: Vec<serde_json::Value> = records.iter().map(summary_json).collect();
        match serde_json::to_string_pretty(&rows) {
            Ok(s) => println!("{s}"),
            Err(e) => tracing::error!(error = %e, "failed to render JSON results"),
        }
        return;
    }
    for r in records {
        let mut line = format!(
            "value {:>8}  samples {:>5}  [{}]",
            r.parameter,
            r.series.len(),
            r.termination.as_str()
        );
        if let Some(p) = r.plant {
            line.push_str(&format!(
                "  tau {:.3} s  K {:.3}  w_ss {:.1} deg/s",
                p.tau_s, p.gain, p.steady_velocity
            ));
        }
        if let Some(m) = r.metrics {
            match m.rise_time_s {
                Some(rt) => line.push_str(&format!("  rise {rt:.3} s")),
                None => line.push_str("  rise n/a"),
            }
            line.push_str(&format!(
                "  overshoot {:.1}%  settle {:.3} s  sse {:.2}",
                m.overshoot_pct, m.settling_time_s, m.steady_state_error
            ));
        }
        println!("{line}");
    }
}
