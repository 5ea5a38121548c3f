//! Trailing-window classifiers for steady-state and stop detection.

use std::collections::VecDeque;

/// Statistic evaluated over the trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStat {
    /// Population standard deviation; low spread means the signal flattened.
    StdDev,
    /// Mean absolute value; low magnitude means the signal died out.
    MeanAbs,
}

/// Windowed-statistic classifier over a scalar signal.
///
/// The steady-state configuration refuses to decide before a full window of
/// history exists; the stop configuration may call "stopped" from a single
/// low reading while history is short. A premature "steady" truncates the
/// transient being captured, while a premature "stopped" merely restarts a
/// run.
#[derive(Debug)]
pub struct WindowDetector {
    window: usize,
    threshold: f64,
    stat: WindowStat,
    short_buffer_last_sample: bool,
    buf: VecDeque<f64>,
}

impl WindowDetector {
    /// Steady-state detector: std-dev of the last `window` samples under
    /// `threshold`. Never satisfied on partial history.
    pub fn steady(window: usize, threshold: f64) -> Self {
        Self::new(window, threshold, WindowStat::StdDev, false)
    }

    /// Stop detector: mean |v| of the last `window` samples under
    /// `threshold`, with a single-sample fallback while history is short.
    pub fn stop(window: usize, threshold: f64) -> Self {
        Self::new(window, threshold, WindowStat::MeanAbs, true)
    }

    fn new(window: usize, threshold: f64, stat: WindowStat, short_buffer_last_sample: bool) -> Self {
        let window = window.max(1);
        Self {
            window,
            threshold,
            stat,
            short_buffer_last_sample,
            buf: VecDeque::with_capacity(window),
        }
    }

    /// Append a sample, evicting the oldest beyond the window size.
    pub fn push(&mut self, value: f64) {
        self.buf.push_back(value);
        if self.buf.len() > self.window {
            self.buf.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Whether the configured statistic over a full window is below the
    /// threshold, or — for the stop configuration only — whether the single
    /// most recent reading is already low while history is short.
    pub fn is_satisfied(&self) -> bool {
        if self.buf.len() < self.window {
            return self.short_buffer_last_sample
                && self.buf.back().is_some_and(|v| v.abs() < self.threshold);
        }
        let stat = match self.stat {
            WindowStat::StdDev => {
                let n = self.buf.len() as f64;
                let mean = self.buf.iter().sum::<f64>() / n;
                let var = self.buf.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                var.sqrt()
            }
            WindowStat::MeanAbs => {
                let n = self.buf.len() as f64;
                self.buf.iter().map(|v| v.abs()).sum::<f64>() / n
            }
        };
        stat < self.threshold
    }
}
