//! Operations on a live PTY: input, drained output, resize, exit.

use std::io::Write;
use std::sync::mpsc::TryRecvError;

use portable_pty::PtySize;

use super::types::{PtyControl, PtyOutput, PtyWriter};

/// Result of one non-blocking drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PtyRead {
    /// Output produced since the last drain. Empty means nothing yet.
    Data(Vec<u8>),
    /// The reader thread hit end-of-stream and everything was handed out.
    Eof,
}

impl PtyWriter {
    /// Send `data` to the shell and flush it.
    pub fn write_input(&mut self, data: &[u8]) -> Result<(), String> {
        self.writer
            .write_all(data)
            .and_then(|()| self.writer.flush())
            .map_err(|e| format!("write to shell failed: {e}"))
    }
}

impl PtyOutput {
    /// Hand out what the reader thread has produced, without blocking.
    ///
    /// At most `max_output` bytes are returned per call. Anything beyond
    /// that stays queued in order for the next call.
    pub fn read_output(&mut self) -> PtyRead {
        let mut eof = false;
        while self.pending.len() < self.max_output {
            match self.output_rx.try_recv() {
                Ok(chunk) => self.pending.extend(chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    eof = true;
                    break;
                }
            }
        }

        match self.pending.len() {
            0 if eof => PtyRead::Eof,
            n if n <= self.max_output => PtyRead::Data(std::mem::take(&mut self.pending)),
            _ => {
                let rest = self.pending.split_off(self.max_output);
                PtyRead::Data(std::mem::replace(&mut self.pending, rest))
            }
        }
    }
}

impl PtyControl {
    /// Resize to `rows` x `cols`. `Ok(false)` means the PTY already had
    /// that size and was left alone.
    pub fn resize(&mut self, rows: u16, cols: u16) -> Result<bool, String> {
        if self.size() == (rows, cols) {
            return Ok(false);
        }
        let size = PtySize { rows, cols, ..self.size };
        self.master
            .resize(size)
            .map_err(|e| format!("resize to {rows}x{cols} failed: {e}"))?;
        self.size = size;
        Ok(true)
    }

    /// Kill the shell. Errors are ignored; it may have exited already.
    pub fn kill(&mut self) {
        if let Err(e) = self.child.kill() {
            tracing::debug!(error = %e, "kill on shell failed");
        }
    }

    /// Block until the shell exits and return its exit code.
    pub fn wait_exit_code(&mut self) -> Option<u32> {
        match self.child.wait() {
            Ok(status) => Some(status.exit_code()),
            Err(e) => {
                tracing::debug!(error = %e, "wait on shell failed");
                None
            }
        }
    }
}
