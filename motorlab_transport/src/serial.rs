//! Serial-port transport with a background line pump.
//!
//! A reader thread owns the receive side of the port, accumulates bytes
//! into complete lines, and pushes them through an unbounded channel;
//! `drain_lines` is a lock-free `try_iter` drain that never blocks.
//!
//! Safety: each transport spawns exactly one thread that is shut down when
//! the transport is dropped, preventing thread leaks.

use std::io::{Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel as xch;
use motorlab_traits::Transport;

use crate::error::LinkError;

/// Per-read timeout of the pump thread. Short enough that shutdown stays
/// responsive, long enough not to spin.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

pub struct SerialTransport {
    writer: Box<dyn serialport::SerialPort>,
    rx: xch::Receiver<String>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl SerialTransport {
    /// Open `port` at `baud` and start the line pump.
    pub fn open(port: &str, baud: u32) -> Result<Self, LinkError> {
        let writer = serialport::new(port, baud)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| LinkError::Serial(format!("open {port}: {e}")))?;
        let reader = writer
            .try_clone()
            .map_err(|e| LinkError::Serial(e.to_string()))?;
        let (tx, rx) = xch::unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let join_handle = std::thread::spawn(move || pump_lines(reader, tx, shutdown_clone));
        tracing::info!(port, baud, "serial link open");
        Ok(Self {
            writer,
            rx,
            shutdown,
            join_handle: Some(join_handle),
        })
    }
}

fn pump_lines(
    mut port: Box<dyn serialport::SerialPort>,
    tx: xch::Sender<String>,
    shutdown: Arc<AtomicBool>,
) {
    let mut pending: Vec<u8> = Vec::with_capacity(128);
    let mut buf = [0u8; 256];
    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        match port.read(&mut buf) {
            Ok(0) => {}
            Ok(n) => {
                for &b in &buf[..n] {
                    if b == b'\n' {
                        let line = String::from_utf8_lossy(&pending).trim().to_string();
                        pending.clear();
                        if line.is_empty() {
                            continue;
                        }
                        if tx.send(line).is_err() {
                            tracing::debug!("line consumer disconnected, exiting pump");
                            return;
                        }
                    } else {
                        pending.push(b);
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {}
            Err(e) => {
                // Transient faults are survivable; the poll loop upstream
                // simply sees no lines until data flows again.
                tracing::warn!(error = %e, "serial read failed");
            }
        }
    }
    tracing::trace!("serial pump exiting cleanly");
}

impl Transport for SerialTransport {
    fn drain_lines(&mut self) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.rx.try_iter().collect())
    }

    fn write_line(
        &mut self,
        line: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    fn clear_input(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Err(e) = self.writer.clear(serialport::ClearBuffer::Input) {
            tracing::warn!(error = %e, "failed to clear OS input buffer");
        }
        for _ in self.rx.try_iter() {}
        Ok(())
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // The pump exits within one read timeout of the flag being set.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("serial pump joined"),
                Err(e) => tracing::warn!(?e, "serial pump panicked during shutdown"),
            }
        }
    }
}
