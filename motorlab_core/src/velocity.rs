//! Wrap-aware angular-velocity estimation.

/// One wrap-corrected angular-velocity sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocitySample {
    /// Seconds since the start of the current run.
    pub t: f64,
    /// Degrees per second.
    pub value: f64,
}

/// Converts a stream of wrapped encoder angles into angular velocity by
/// finite differencing with shortest-path unwrap across the 0/360 boundary.
///
/// Restartable: `reset()` returns it to the first-point state for a new run.
/// Never shared across runs.
#[derive(Debug, Default)]
pub struct AngleVelocityEstimator {
    last: Option<(f64, f64)>, // (angle_deg, t_s)
}

impl AngleVelocityEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the stored reference; the next observation starts a new run.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Feed one angle sample. Emits nothing on the first observation after a
    /// reset. A non-positive dt (duplicate or out-of-order timestamp) is
    /// swallowed but still replaces the stored reference, so one bad sample
    /// cannot stall the stream.
    pub fn observe(&mut self, angle_deg: f64, t_s: f64) -> Option<VelocitySample> {
        let prev = self.last.replace((angle_deg, t_s));
        let (last_angle, last_t) = prev?;
        let dt = t_s - last_t;
        if dt <= 0.0 {
            return None;
        }
        let mut delta = angle_deg - last_angle;
        // Shortest-path unwrap keeps velocity continuous across 0/360.
        if delta > 180.0 {
            delta -= 360.0;
        } else if delta < -180.0 {
            delta += 360.0;
        }
        Some(VelocitySample {
            t: t_s,
            value: delta / dt,
        })
    }
}
