//! PTY backend: owns one pseudoterminal and the shell running in it.
//!
//! Uses `portable-pty` for cross-platform PTY spawning. A background reader
//! thread forwards output over a channel so reads from the bridge never
//! block. Input, output and control are separate parts of the handle so
//! each can be locked on its own.

mod io;
mod spawn;
mod types;

pub use io::PtyRead;
pub use spawn::{default_shell, spawn_pty};
pub use types::{PtyControl, PtyHandle, PtyOutput, PtyWriter, DEFAULT_COLS, DEFAULT_ROWS, PTY_MAX_OUTPUT_PER_FRAME, PTY_READ_CHUNK};
