//! PTY handle types and size constants.

use std::io::Write;
use std::sync::mpsc;

use portable_pty::{Child, MasterPty, PtySize};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Maximum bytes read from the PTY by the reader thread at once (8 KB).
pub const PTY_READ_CHUNK: usize = 8_192;

/// Default upper bound on bytes returned by one drain (64 KB).
pub const PTY_MAX_OUTPUT_PER_FRAME: usize = 65_536;

/// Default terminal columns.
pub const DEFAULT_COLS: u16 = 80;

/// Default terminal rows.
pub const DEFAULT_ROWS: u16 = 24;

// =============================================================================
// PTY HANDLE
// =============================================================================

/// Input side of the PTY. Writes may block when the shell stops reading.
pub struct PtyWriter {
    pub(crate) writer: Box<dyn Write + Send>,
}

/// Output side: chunks from the reader thread, handed out in bounded drains.
pub struct PtyOutput {
    pub(crate) output_rx: mpsc::Receiver<Vec<u8>>,
    /// Received from the reader thread but not yet handed out.
    pub(crate) pending: Vec<u8>,
    pub(crate) max_output: usize,
}

/// Master and child: resize, kill, reap.
pub struct PtyControl {
    pub(crate) child: Box<dyn Child + Send + Sync>,
    pub(crate) master: Box<dyn MasterPty + Send>,
    pub(crate) size: PtySize,
}

/// One PTY and the shell bound to it.
///
/// The three parts are independent, so a caller can lock them separately
/// and a write stuck on a full input buffer never holds up output or resize.
pub struct PtyHandle {
    pub writer: PtyWriter,
    pub output: PtyOutput,
    pub control: PtyControl,
}

impl PtyOutput {
    /// Change the per-drain output cap. Zero is treated as one byte.
    pub fn set_max_output(&mut self, max_output: usize) {
        self.max_output = max_output.max(1);
    }
}

impl PtyControl {
    /// Current `(rows, cols)`.
    pub fn size(&self) -> (u16, u16) {
        (self.size.rows, self.size.cols)
    }
}

impl std::fmt::Debug for PtyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PtyHandle")
            .field("rows", &self.control.size.rows)
            .field("cols", &self.control.size.cols)
            .field("pending", &self.output.pending.len())
            .field("max_output", &self.output.max_output)
            .finish()
    }
}
