//! Tunable settings for the characterization and sweep drivers.
//!
//! Defaults mirror the bench rig this was built against: five duty points,
//! 25-sample detector windows at 2.0 / 1.0 deg/s, 50 ms polling, and the
//! 2-second bounded gain trials of the tuning scripts.

/// Trailing-window detector parameters.
#[derive(Debug, Clone, Copy)]
pub struct DetectorCfg {
    pub window: usize,
    pub threshold: f64,
}

/// Step-response characterization settings.
#[derive(Debug, Clone)]
pub struct ExperimentCfg {
    /// Duty values to test, one run each, in order.
    pub duty_values: Vec<i32>,
    /// Steady-state detector (std-dev based).
    pub steady: DetectorCfg,
    /// Stop detector (mean-|v| based).
    pub stop: DetectorCfg,
    /// Poll interval of the driving loop, ms.
    pub poll_ms: u64,
    /// Wall-clock pause between runs, ms. Decoupled from sample timing.
    pub settle_ms: u64,
}

impl Default for ExperimentCfg {
    fn default() -> Self {
        Self {
            duty_values: vec![150, 175, 200, 225, 250],
            steady: DetectorCfg {
                window: 25,
                threshold: 2.0,
            },
            stop: DetectorCfg {
                window: 25,
                threshold: 1.0,
            },
            poll_ms: 50,
            settle_ms: 1_000,
        }
    }
}

/// Gain-sweep trial settings. Termination is purely time-bounded, so the
/// whole sweep duration is predictable up front.
#[derive(Debug, Clone)]
pub struct SweepCfg {
    /// Step target, degrees. Must be > 0.
    pub target: f64,
    /// Data-collection window per trial, ms.
    pub test_duration_ms: u64,
    /// Poll interval while collecting, ms.
    pub poll_ms: u64,
    /// Pause after the stop command, ms.
    pub stop_settle_ms: u64,
    /// Pause after zeroing, ms.
    pub zero_settle_ms: u64,
    /// Pause after loading gains, ms.
    pub gain_settle_ms: u64,
    /// Pause after commanding the return to zero, ms.
    pub return_settle_ms: u64,
}

impl Default for SweepCfg {
    fn default() -> Self {
        Self {
            target: 200.0,
            test_duration_ms: 2_000,
            poll_ms: 10,
            stop_settle_ms: 100,
            zero_settle_ms: 500,
            gain_settle_ms: 100,
            return_settle_ms: 1_500,
        }
    }
}
