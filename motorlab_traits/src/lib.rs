pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Line-oriented, non-blocking view of the physical link to the controller
/// board. Framing, reconnects and byte-level concerns live behind this trait;
/// the core only ever sees complete text lines and writes complete commands.
pub trait Transport {
    /// Drain every complete line currently buffered. Never blocks waiting for
    /// more data; an empty Vec means nothing has arrived since the last call.
    fn drain_lines(&mut self) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;

    /// Write one command line. The implementation appends the newline
    /// terminator and flushes.
    fn write_line(&mut self, line: &str)
    -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Discard any buffered input (both OS-side and locally queued lines).
    fn clear_input(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn drain_lines(&mut self) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        (**self).drain_lines()
    }

    fn write_line(
        &mut self,
        line: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).write_line(line)
    }

    fn clear_input(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).clear_input()
    }
}
