//! Mappings from the on-disk config schema to core settings.

use crate::config::{DetectorCfg, ExperimentCfg, SweepCfg};

impl From<&motorlab_config::ExperimentCfg> for ExperimentCfg {
    fn from(c: &motorlab_config::ExperimentCfg) -> Self {
        Self {
            duty_values: c.duty_values.clone(),
            steady: DetectorCfg {
                window: c.steady_window,
                threshold: c.steady_threshold,
            },
            stop: DetectorCfg {
                window: c.stop_window,
                threshold: c.stop_threshold,
            },
            poll_ms: c.poll_ms,
            settle_ms: c.settle_ms,
        }
    }
}

impl From<&motorlab_config::SweepCfg> for SweepCfg {
    fn from(c: &motorlab_config::SweepCfg) -> Self {
        Self {
            target: c.target_deg,
            test_duration_ms: c.test_duration_ms,
            poll_ms: c.poll_ms,
            stop_settle_ms: c.stop_settle_ms,
            zero_settle_ms: c.zero_settle_ms,
            gain_settle_ms: c.gain_settle_ms,
            return_settle_ms: c.return_settle_ms,
        }
    }
}
