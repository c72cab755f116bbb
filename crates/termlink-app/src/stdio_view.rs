//! `TerminalView` over the host terminal.
//!
//! The host terminal does the actual rendering, so feeding a chunk means
//! writing it to stdout. Keys are read with crossterm on a dedicated thread,
//! translated to PTY bytes and fanned out to input subscribers. Host resizes
//! arrive as crossterm resize events. Pastes are bracketed only while the
//! shell has bracketed-paste mode switched on in its output.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event};
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode};
use crossterm::ExecutableCommand;
use termlink_bridge::TerminalView;
use termlink_common::{Geometry, InputEvent, OutputChunk};
use tokio::sync::mpsc;

use crate::font::{self, FontAction};
use crate::keys::key_to_bytes;

const INPUT_POLL: Duration = Duration::from_millis(50);

// =============================================================================
// RAW MODE
// =============================================================================

/// Puts the host terminal in raw mode with bracketed paste; undoes both on drop.
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    pub fn enter() -> std::io::Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = std::io::stdout().execute(EnableBracketedPaste) {
            tracing::debug!("bracketed paste unavailable: {e}");
        }
        Ok(Self { active: true })
    }

    pub fn restore(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let _ = std::io::stdout().execute(DisableBracketedPaste);
        if let Err(e) = disable_raw_mode() {
            tracing::warn!("failed to restore terminal mode: {e}");
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

// =============================================================================
// PASTE MODE
// =============================================================================

const PASTE_MODE_ON: &[u8] = b"\x1b[?2004h";
const PASTE_MODE_OFF: &[u8] = b"\x1b[?2004l";

/// Whether the shell asked for bracketed paste (DECSET 2004).
#[derive(Default)]
struct PasteMode {
    enabled: AtomicBool,
    /// Unmatched end of the previous chunk, shorter than a full sequence.
    tail: Mutex<Vec<u8>>,
}

impl PasteMode {
    /// Track mode switches in shell output. The last switch in a chunk wins.
    fn observe(&self, output: &[u8]) {
        let mut tail = self.tail.lock().unwrap_or_else(PoisonError::into_inner);
        let mut window = std::mem::take(&mut *tail);
        window.extend_from_slice(output);

        let last_switch = window.windows(PASTE_MODE_ON.len()).rev().find_map(|w| {
            if w == PASTE_MODE_ON {
                Some(true)
            } else if w == PASTE_MODE_OFF {
                Some(false)
            } else {
                None
            }
        });
        if let Some(on) = last_switch {
            tracing::trace!(on, "bracketed paste mode switched");
            self.enabled.store(on, Ordering::Relaxed);
        }

        let keep = window.len().min(PASTE_MODE_ON.len() - 1);
        *tail = window.split_off(window.len() - keep);
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        if !self.enabled.load(Ordering::Relaxed) {
            return text.as_bytes().to_vec();
        }
        let mut bytes = b"\x1b[200~".to_vec();
        bytes.extend_from_slice(text.as_bytes());
        bytes.extend_from_slice(b"\x1b[201~");
        bytes
    }
}

// =============================================================================
// VIEW
// =============================================================================

#[derive(Default)]
struct Subscribers {
    input: Mutex<Vec<mpsc::UnboundedSender<InputEvent>>>,
    resize: Mutex<Vec<mpsc::UnboundedSender<()>>>,
}

impl Subscribers {
    fn send_input(&self, event: InputEvent) {
        if let Ok(mut subs) = self.input.lock() {
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    fn notify_resize(&self) {
        if let Ok(mut subs) = self.resize.lock() {
            subs.retain(|tx| tx.send(()).is_ok());
        }
    }
}

pub struct StdioView {
    subscribers: Arc<Subscribers>,
    paste: Arc<PasteMode>,
    fallback: Geometry,
    font_size: AtomicU32,
    stop: Arc<AtomicBool>,
    reader: Mutex<Option<thread::JoinHandle<()>>>,
}

impl StdioView {
    /// `fallback` is reported when the host terminal can't be measured.
    pub fn new(fallback: Geometry) -> Self {
        Self {
            subscribers: Arc::new(Subscribers::default()),
            paste: Arc::new(PasteMode::default()),
            fallback,
            font_size: AtomicU32::new(0),
            stop: Arc::new(AtomicBool::new(false)),
            reader: Mutex::new(None),
        }
    }

    /// Start reading host input. Font shortcuts go to `font_actions`
    /// instead of the shell.
    pub fn start_input(&self, font_actions: mpsc::UnboundedSender<FontAction>) -> std::io::Result<()> {
        let subscribers = Arc::clone(&self.subscribers);
        let paste = Arc::clone(&self.paste);
        let stop = Arc::clone(&self.stop);

        let handle = thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    match event::poll(INPUT_POLL) {
                        Ok(false) => continue,
                        Ok(true) => {}
                        Err(e) => {
                            tracing::warn!("input poll failed: {e}");
                            break;
                        }
                    }
                    let event = match event::read() {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!("input read failed: {e}");
                            break;
                        }
                    };
                    match event {
                        Event::Key(key) => {
                            if let Some(action) = font::shortcut(&key) {
                                let _ = font_actions.send(action);
                            } else if let Some(bytes) = key_to_bytes(&key) {
                                subscribers.send_input(InputEvent::new(bytes));
                            }
                        }
                        Event::Paste(text) => {
                            subscribers.send_input(InputEvent::new(paste.encode(&text)));
                        }
                        Event::Resize(_, _) => subscribers.notify_resize(),
                        _ => {}
                    }
                }
                tracing::debug!("stdin reader stopped");
            })?;

        if let Ok(mut reader) = self.reader.lock() {
            *reader = Some(handle);
        }
        Ok(())
    }

    /// Stop the input thread and wait for it.
    pub fn stop_input(&self) {
        self.stop.store(true, Ordering::Relaxed);
        let handle = self.reader.lock().ok().and_then(|mut r| r.take());
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

#[async_trait]
impl TerminalView for StdioView {
    async fn feed(&self, chunk: OutputChunk) -> Result<(), String> {
        self.paste.observe(chunk.as_bytes());
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut out = std::io::stdout().lock();
            out.write_all(chunk.as_bytes())?;
            out.flush()
        })
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| format!("stdout write failed: {e}"))
    }

    fn writeln(&self, text: &str) {
        // Raw mode: no implicit carriage return
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "{text}\r\n");
        let _ = out.flush();
    }

    fn measure_and_fit(&self) -> Option<Geometry> {
        match terminal::size() {
            Ok((cols, rows)) => Geometry::new(rows, cols).or(Some(self.fallback)),
            Err(e) => {
                tracing::debug!("host terminal size unavailable: {e}");
                Some(self.fallback)
            }
        }
    }

    fn subscribe_input(&self) -> mpsc::UnboundedReceiver<InputEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subs) = self.subscribers.input.lock() {
            subs.push(tx);
        }
        rx
    }

    fn subscribe_resize(&self) -> mpsc::UnboundedReceiver<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subs) = self.subscribers.resize.lock() {
            subs.push(tx);
        }
        rx
    }

    /// The host terminal owns its font; the size is only recorded.
    fn set_font_size(&self, size: u32) {
        let previous = self.font_size.swap(size, Ordering::Relaxed);
        if previous != size {
            tracing::info!(from = previous, to = size, "font size changed");
        }
    }
}

impl Drop for StdioView {
    fn drop(&mut self) {
        self.stop_input();
    }
}
