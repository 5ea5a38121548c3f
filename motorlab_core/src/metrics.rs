//! Step-response performance metrics.
//!
//! Pure, deterministic functions of (t, y, target); identical inputs give
//! bit-identical outputs. The time axis is normalized to its first sample,
//! so device timestamps can be passed as-is.

use crate::error::MetricsError;
use crate::util::mean;

/// Fraction of target for the rise-time start threshold.
const RISE_LOW: f64 = 0.1;
/// Fraction of target for the rise-time end threshold.
const RISE_HIGH: f64 = 0.9;
/// Half-width of the settling band as a fraction of target.
const SETTLING_BAND: f64 = 0.02;
/// Fraction of the trace averaged for the steady-state error.
const TAIL_FRACTION: f64 = 0.9;

/// Standard step metrics for one trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepMetrics {
    /// 10% → 90% rise time, seconds. None when either threshold is never
    /// crossed.
    pub rise_time_s: Option<f64>,
    /// Peak excursion above target, percent of target. Zero when the
    /// response never exceeds target.
    pub overshoot_pct: f64,
    /// 2%-band settling time, seconds. See [`settling_time`].
    pub settling_time_s: f64,
    /// target − mean of the last 10% of samples.
    pub steady_state_error: f64,
}

/// Compute all metrics at once. Fails on a non-positive (or non-finite)
/// target, mismatched series lengths, or an empty series.
pub fn evaluate(t: &[f64], y: &[f64], target: f64) -> Result<StepMetrics, MetricsError> {
    if !(target > 0.0) {
        return Err(MetricsError::InvalidTarget(target));
    }
    if t.len() != y.len() {
        return Err(MetricsError::LengthMismatch {
            t: t.len(),
            y: y.len(),
        });
    }
    if y.is_empty() {
        return Err(MetricsError::EmptySeries);
    }
    Ok(StepMetrics {
        rise_time_s: rise_time(t, y, target),
        overshoot_pct: overshoot(y, target),
        settling_time_s: settling_time(t, y, target),
        steady_state_error: steady_state_error(y, target),
    })
}

/// Time between the first crossings of 10% and 90% of target.
pub fn rise_time(t: &[f64], y: &[f64], target: f64) -> Option<f64> {
    let lo = y.iter().position(|&v| v >= RISE_LOW * target)?;
    let hi = y.iter().position(|&v| v >= RISE_HIGH * target)?;
    Some(t[hi] - t[lo])
}

/// Peak excursion above target as a percentage of target; zero when the
/// response never exceeds it.
pub fn overshoot(y: &[f64], target: f64) -> f64 {
    let peak = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if peak > target {
        (peak - target) / target * 100.0
    } else {
        0.0
    }
}

/// 2%-band settling time: scan from the end for the latest sample outside
/// the band; the settling time is the next sample after that last
/// departure. A trace that is out of band at its final sample, or one that
/// never leaves the band at all, reports the full trial duration — the
/// never/always-settled sentinel.
pub fn settling_time(t: &[f64], y: &[f64], target: f64) -> f64 {
    let t0 = t[0];
    let full = t[t.len() - 1] - t0;
    let band = SETTLING_BAND * target;
    let last_violation = (0..y.len()).rev().find(|&i| (y[i] - target).abs() > band);
    match last_violation {
        None => full,
        Some(i) if i + 1 >= t.len() => full,
        Some(i) => t[i + 1] - t0,
    }
}

/// target − mean of the last 10% of samples. Averaging the tail suppresses
/// measurement noise that a single final sample would pass through.
pub fn steady_state_error(y: &[f64], target: f64) -> f64 {
    let start = (y.len() as f64 * TAIL_FRACTION) as usize;
    target - mean(y[start..].iter().copied())
}
