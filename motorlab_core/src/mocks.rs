//! Test doubles for transports and recorders.

use std::collections::VecDeque;

use motorlab_traits::Transport;

use crate::record::{RunRecord, RunRecorder};

/// Transport fed from pre-scripted line batches. Each `drain_lines` call
/// pops one batch; every written command is kept for inspection.
///
/// `clear_input` only counts the call and leaves the script intact, so a
/// test can pre-load trial responses before the driver clears its buffer.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    batches: VecDeque<Vec<String>>,
    pub writes: Vec<String>,
    pub clears: usize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.batches
            .push_back(lines.into_iter().map(Into::into).collect());
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.push_batch([line.into()]);
    }
}

impl Transport for ScriptedTransport {
    fn drain_lines(&mut self) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }

    fn write_line(
        &mut self,
        line: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.writes.push(line.to_string());
        Ok(())
    }

    fn clear_input(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.clears += 1;
        Ok(())
    }
}

/// Transport whose writes always fail; drains are empty.
#[derive(Debug, Default)]
pub struct BrokenTransport;

impl Transport for BrokenTransport {
    fn drain_lines(&mut self) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Vec::new())
    }

    fn write_line(
        &mut self,
        _line: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("wire unplugged")))
    }

    fn clear_input(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// Recorder that swallows everything; for dry runs.
#[derive(Debug, Default)]
pub struct NullRecorder;

impl RunRecorder for NullRecorder {
    fn record_run(
        &mut self,
        _record: &RunRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }

    fn finalize(
        &mut self,
        _results: &[RunRecord],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// Recorder that keeps everything it is given; for tests.
#[derive(Debug, Default)]
pub struct CollectingRecorder {
    pub runs: Vec<RunRecord>,
    pub finalize_calls: usize,
    pub finalized_len: Option<usize>,
}

impl RunRecorder for CollectingRecorder {
    fn record_run(
        &mut self,
        record: &RunRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.runs.push(record.clone());
        Ok(())
    }

    fn finalize(
        &mut self,
        results: &[RunRecord],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.finalize_calls += 1;
        self.finalized_len = Some(results.len());
        Ok(())
    }
}
