//! First-order plant fitting from a captured velocity trace.
//!
//! The firmware announces its own τ/K when it manages to; this is the
//! host-side equivalent over a sealed trace, so characterization works even
//! against firmware that only streams raw samples.

use crate::record::TracePoint;
use crate::util::mean;

/// Minimum settled speed (deg/s) considered a real response rather than
/// noise around zero.
const MIN_STEADY_VELOCITY: f64 = 1.0;

/// First-order model estimate extracted from one step trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlantEstimate {
    /// Time constant, seconds: time to reach 63.2% of the steady speed.
    pub tau_s: f64,
    /// DC gain, (deg/s) per duty unit.
    pub gain: f64,
    /// Settled angular speed both numbers are derived from, deg/s.
    pub steady_velocity: f64,
}

/// Fit τ and K from a velocity step trace.
///
/// The steady speed is the mean |v| over the last `tail_len` samples (the
/// same window the steady-state detector judged). τ is the time from the
/// first sample to the first crossing of start + 0.632·(ω_ss − start);
/// K = ω_ss / duty. Returns None when the trace is too short, never rose,
/// or never crossed the 63.2% threshold.
pub fn fit_first_order(series: &[TracePoint], duty: f64, tail_len: usize) -> Option<PlantEstimate> {
    if series.len() < 2 || duty == 0.0 {
        return None;
    }
    let tail_start = series.len().saturating_sub(tail_len.max(1));
    let steady_velocity = mean(series[tail_start..].iter().map(|p| p.value.abs()));
    if steady_velocity < MIN_STEADY_VELOCITY {
        return None;
    }
    let t0 = series[0].t;
    let start = series[0].value.abs();
    if steady_velocity <= start {
        return None;
    }
    let threshold = start + 0.632 * (steady_velocity - start);
    let crossing = series.iter().find(|p| p.value.abs() >= threshold)?;
    Some(PlantEstimate {
        tau_s: crossing.t - t0,
        gain: steady_velocity / duty,
        steady_velocity,
    })
}
