//! `Transport` over a PTY owned by this process.
//!
//! A live shell is split into writer, output and control parts, each behind
//! its own lock. A write blocked on a shell that stopped reading therefore
//! never holds up output, resize or close. Spawning, writing and reaping
//! run on the blocking pool; no lock is held across an await.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use termlink_common::{Geometry, OutputChunk, TransportError};
use termlink_config::schema::{ShellConfig, TermlinkConfig};
use termlink_pty::{
    spawn_pty, PtyControl, PtyHandle, PtyOutput, PtyRead, PtyWriter, DEFAULT_COLS, DEFAULT_ROWS,
    PTY_MAX_OUTPUT_PER_FRAME,
};

use crate::permit::ReadPermit;
use crate::transport::{ReadOutcome, Transport};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct LiveShell {
    writer: Arc<Mutex<PtyWriter>>,
    output: Mutex<PtyOutput>,
    control: Arc<Mutex<PtyControl>>,
}

impl From<PtyHandle> for LiveShell {
    fn from(pty: PtyHandle) -> Self {
        Self {
            writer: Arc::new(Mutex::new(pty.writer)),
            output: Mutex::new(pty.output),
            control: Arc::new(Mutex::new(pty.control)),
        }
    }
}

enum Phase {
    Idle,
    Spawning,
    Live(Arc<LiveShell>),
    /// Output ended or the session was closed; holds the exit code.
    Closed(Option<u32>),
}

pub struct LocalTransport {
    shell: ShellConfig,
    term: String,
    max_output: usize,
    phase: Mutex<Phase>,
    /// Latest requested size. Used at spawn, and applied right after it
    /// if a resize arrived while the shell was starting.
    spawn_size: Mutex<(u16, u16)>,
}

impl LocalTransport {
    pub fn new(shell: ShellConfig, term: impl Into<String>) -> Self {
        Self::with_spawn_size(shell, term, DEFAULT_ROWS, DEFAULT_COLS)
    }

    /// Shell spawned at `rows` x `cols` unless a resize arrives first.
    pub fn with_spawn_size(shell: ShellConfig, term: impl Into<String>, rows: u16, cols: u16) -> Self {
        Self {
            shell,
            term: term.into(),
            max_output: PTY_MAX_OUTPUT_PER_FRAME,
            phase: Mutex::new(Phase::Idle),
            spawn_size: Mutex::new((rows.max(1), cols.max(1))),
        }
    }

    pub fn from_config(config: &TermlinkConfig) -> Self {
        Self::with_spawn_size(
            config.shell.clone(),
            config.terminal.term.clone(),
            config.terminal.rows,
            config.terminal.cols,
        )
        .max_output(config.performance.max_output_per_frame as usize)
    }

    /// Upper bound on bytes returned by one read.
    pub fn max_output(mut self, max_output: usize) -> Self {
        self.max_output = max_output.max(1);
        self
    }

    fn live(&self) -> Option<Arc<LiveShell>> {
        match &*lock(&self.phase) {
            Phase::Live(shell) => Some(Arc::clone(shell)),
            _ => None,
        }
    }
}

fn join_error(e: tokio::task::JoinError) -> TransportError {
    TransportError::Join(e.to_string())
}

#[async_trait]
impl Transport for LocalTransport {
    async fn create_session(&self) -> Result<(), TransportError> {
        let (rows, cols) = {
            let mut phase = lock(&self.phase);
            if !matches!(*phase, Phase::Idle) {
                return Err(TransportError::AlreadyExists);
            }
            *phase = Phase::Spawning;
            *lock(&self.spawn_size)
        };

        let shell = self.shell.clone();
        let term = self.term.clone();
        let spawned = tokio::task::spawn_blocking(move || spawn_pty(&shell, &term, rows, cols))
            .await
            .map_err(join_error)
            .and_then(|result| result.map_err(TransportError::from));

        let mut phase = lock(&self.phase);
        let mut pty = match spawned {
            Ok(pty) => pty,
            Err(e) => {
                if matches!(*phase, Phase::Spawning) {
                    *phase = Phase::Idle;
                }
                return Err(e);
            }
        };
        if !matches!(*phase, Phase::Spawning) {
            tracing::debug!("session closed while the shell was starting");
            tokio::task::spawn_blocking(move || {
                pty.control.kill();
                pty.control.wait_exit_code()
            });
            return Err(TransportError::Rejected("session closed during startup".into()));
        }

        pty.output.set_max_output(self.max_output);
        let (want_rows, want_cols) = *lock(&self.spawn_size);
        if let Err(e) = pty.control.resize(want_rows, want_cols) {
            tracing::warn!(error = %e, "resize after spawn failed");
        }
        *phase = Phase::Live(Arc::new(LiveShell::from(pty)));
        Ok(())
    }

    async fn write_input(&self, data: &[u8]) -> Result<(), TransportError> {
        let writer = match self.live() {
            Some(shell) => Arc::clone(&shell.writer),
            None => return Err(TransportError::NoSession),
        };

        let data = data.to_vec();
        tokio::task::spawn_blocking(move || lock(&writer).write_input(&data).map_err(TransportError::from))
            .await
            .map_err(join_error)?
    }

    async fn read_output(&self, _permit: &mut ReadPermit) -> Result<ReadOutcome, TransportError> {
        let shell = match &*lock(&self.phase) {
            Phase::Live(shell) => Arc::clone(shell),
            Phase::Closed(exit_code) => return Ok(ReadOutcome::Closed { exit_code: *exit_code }),
            Phase::Idle | Phase::Spawning => return Ok(ReadOutcome::Data(OutputChunk::empty())),
        };

        let read = lock(&shell.output).read_output();
        match read {
            PtyRead::Data(bytes) => Ok(ReadOutcome::Data(OutputChunk::new(bytes))),
            PtyRead::Eof => {
                let control = Arc::clone(&shell.control);
                let exit_code = tokio::task::spawn_blocking(move || lock(&control).wait_exit_code())
                    .await
                    .map_err(join_error)?;
                tracing::info!(?exit_code, "shell exited");
                *lock(&self.phase) = Phase::Closed(exit_code);
                Ok(ReadOutcome::Closed { exit_code })
            }
        }
    }

    async fn resize(&self, geometry: Geometry) -> Result<(), TransportError> {
        let (rows, cols) = (geometry.rows(), geometry.cols());
        *lock(&self.spawn_size) = (rows, cols);
        if let Some(shell) = self.live() {
            lock(&shell.control).resize(rows, cols)?;
        }
        Ok(())
    }

    async fn close_session(&self) -> Result<(), TransportError> {
        let shell = {
            let mut phase = lock(&self.phase);
            match std::mem::replace(&mut *phase, Phase::Closed(None)) {
                Phase::Live(shell) => shell,
                // create_session kills the shell once the spawn returns
                Phase::Spawning => return Ok(()),
                other => {
                    *phase = other;
                    return Ok(());
                }
            }
        };

        let control = Arc::clone(&shell.control);
        let exit_code = tokio::task::spawn_blocking(move || {
            let mut control = lock(&control);
            control.kill();
            control.wait_exit_code()
        })
        .await
        .map_err(join_error)?;
        tracing::debug!(?exit_code, "shell closed");
        *lock(&self.phase) = Phase::Closed(exit_code);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
