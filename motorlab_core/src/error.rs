use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum TuneError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("recorder error: {0}")]
    Recorder(String),
    #[error("invalid config: {0}")]
    Config(&'static str),
}

/// Errors from the pure metric functions. `InvalidTarget` is a caller error;
/// `EmptySeries` marks a trial that produced no samples and is recoverable
/// (the sweep records the run without metrics).
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum MetricsError {
    #[error("target must be > 0, got {0}")]
    InvalidTarget(f64),
    #[error("empty response series")]
    EmptySeries,
    #[error("time/value series length mismatch: {t} vs {y}")]
    LengthMismatch { t: usize, y: usize },
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
