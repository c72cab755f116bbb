//! Scriptable transport and view used by the bridge tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use termlink_common::{Geometry, InputEvent, OutputChunk, TransportError};
use tokio::sync::mpsc;

use crate::permit::ReadPermit;
use crate::transport::{ReadOutcome, Transport};
use crate::view::TerminalView;

/// One observable call, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Create,
    Read,
    Write(Vec<u8>),
    Resize(u16, u16),
    Feed(Vec<u8>),
    Close,
}

/// Call log shared between a mock transport and a mock view.
#[derive(Debug, Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    pub(crate) fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|&c| pred(c)).count()
    }
}

// =============================================================================
// MOCK TRANSPORT
// =============================================================================

pub(crate) struct MockTransport {
    pub(crate) journal: Journal,
    create_error: Mutex<Option<TransportError>>,
    reads: Mutex<VecDeque<Result<ReadOutcome, TransportError>>>,
    write_failures: Mutex<VecDeque<TransportError>>,
    resize_failures: Mutex<VecDeque<TransportError>>,
    writes_hang: AtomicBool,
    read_delay: Duration,
    reads_in_flight: AtomicUsize,
    max_reads_in_flight: AtomicUsize,
}

impl MockTransport {
    pub(crate) fn new(journal: Journal) -> Self {
        Self {
            journal,
            create_error: Mutex::new(None),
            reads: Mutex::new(VecDeque::new()),
            write_failures: Mutex::new(VecDeque::new()),
            resize_failures: Mutex::new(VecDeque::new()),
            writes_hang: AtomicBool::new(false),
            read_delay: Duration::ZERO,
            reads_in_flight: AtomicUsize::new(0),
            max_reads_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub(crate) fn fail_create(&self, reason: &str) {
        *self.create_error.lock().unwrap() = Some(TransportError::Rejected(reason.into()));
    }

    /// Queue read results. Once the script runs out, reads return empty chunks.
    pub(crate) fn script_reads(&self, outcomes: impl IntoIterator<Item = Result<ReadOutcome, TransportError>>) {
        self.reads.lock().unwrap().extend(outcomes);
    }

    pub(crate) fn fail_next_writes(&self, n: usize, reason: &str) {
        let mut failures = self.write_failures.lock().unwrap();
        for _ in 0..n {
            failures.push_back(TransportError::Rejected(reason.into()));
        }
    }

    /// Every later write stays pending forever, like a shell that stopped reading.
    pub(crate) fn hang_writes(&self) {
        self.writes_hang.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_next_resize(&self, reason: &str) {
        self.resize_failures
            .lock()
            .unwrap()
            .push_back(TransportError::Rejected(reason.into()));
    }

    pub(crate) fn max_reads_in_flight(&self) -> usize {
        self.max_reads_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn writes(&self) -> Vec<Vec<u8>> {
        self.journal
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Write(data) => Some(data),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn resizes(&self) -> Vec<(u16, u16)> {
        self.journal
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Resize(rows, cols) => Some((rows, cols)),
                _ => None,
            })
            .collect()
    }
}

pub(crate) fn data(bytes: &str) -> Result<ReadOutcome, TransportError> {
    Ok(ReadOutcome::Data(OutputChunk::from(bytes)))
}

#[async_trait]
impl Transport for MockTransport {
    async fn create_session(&self) -> Result<(), TransportError> {
        self.journal.push(Call::Create);
        match self.create_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn write_input(&self, data: &[u8]) -> Result<(), TransportError> {
        if self.writes_hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(err) = self.write_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.journal.push(Call::Write(data.to_vec()));
        Ok(())
    }

    async fn read_output(&self, _permit: &mut ReadPermit) -> Result<ReadOutcome, TransportError> {
        let now = self.reads_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_reads_in_flight.fetch_max(now, Ordering::SeqCst);
        self.journal.push(Call::Read);

        if !self.read_delay.is_zero() {
            tokio::time::sleep(self.read_delay).await;
        }
        let outcome = self
            .reads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ReadOutcome::Data(OutputChunk::empty())));

        self.reads_in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    async fn resize(&self, geometry: Geometry) -> Result<(), TransportError> {
        if let Some(err) = self.resize_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.journal.push(Call::Resize(geometry.rows(), geometry.cols()));
        Ok(())
    }

    async fn close_session(&self) -> Result<(), TransportError> {
        self.journal.push(Call::Close);
        Ok(())
    }
}

// =============================================================================
// MOCK VIEW
// =============================================================================

pub(crate) struct MockView {
    journal: Journal,
    lines: Mutex<Vec<String>>,
    geometry: Mutex<Option<Geometry>>,
    input_subs: Mutex<Vec<mpsc::UnboundedSender<InputEvent>>>,
    resize_subs: Mutex<Vec<mpsc::UnboundedSender<()>>>,
    feed_delay: Duration,
    feed_error: Mutex<Option<String>>,
}

impl MockView {
    pub(crate) fn new(journal: Journal) -> Self {
        Self {
            journal,
            lines: Mutex::new(Vec::new()),
            geometry: Mutex::new(Geometry::new(24, 80)),
            input_subs: Mutex::new(Vec::new()),
            resize_subs: Mutex::new(Vec::new()),
            feed_delay: Duration::ZERO,
            feed_error: Mutex::new(None),
        }
    }

    pub(crate) fn with_feed_delay(mut self, delay: Duration) -> Self {
        self.feed_delay = delay;
        self
    }

    pub(crate) fn fail_feeds(&self, reason: &str) {
        *self.feed_error.lock().unwrap() = Some(reason.into());
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub(crate) fn fed(&self) -> Vec<Vec<u8>> {
        self.journal
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Feed(data) => Some(data),
                _ => None,
            })
            .collect()
    }

    /// Change the size `measure_and_fit` reports. `None` means unmeasurable.
    pub(crate) fn set_geometry(&self, geometry: Option<Geometry>) {
        *self.geometry.lock().unwrap() = geometry;
    }

    /// Simulate a display-surface resize.
    pub(crate) fn trigger_resize(&self) {
        self.resize_subs
            .lock()
            .unwrap()
            .retain(|tx| tx.send(()).is_ok());
    }

    /// Simulate the user typing.
    pub(crate) fn type_input(&self, bytes: &str) {
        self.input_subs
            .lock()
            .unwrap()
            .retain(|tx| tx.send(InputEvent::from(bytes)).is_ok());
    }

    /// Drop every input subscriber, as a view does when it is torn down.
    pub(crate) fn close_input(&self) {
        self.input_subs.lock().unwrap().clear();
    }
}

#[async_trait]
impl TerminalView for MockView {
    async fn feed(&self, chunk: OutputChunk) -> Result<(), String> {
        if !self.feed_delay.is_zero() {
            tokio::time::sleep(self.feed_delay).await;
        }
        if let Some(reason) = self.feed_error.lock().unwrap().clone() {
            return Err(reason);
        }
        self.journal.push(Call::Feed(chunk.into_bytes()));
        Ok(())
    }

    fn writeln(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }

    fn measure_and_fit(&self) -> Option<Geometry> {
        *self.geometry.lock().unwrap()
    }

    fn subscribe_input(&self) -> mpsc::UnboundedReceiver<InputEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.input_subs.lock().unwrap().push(tx);
        rx
    }

    fn subscribe_resize(&self) -> mpsc::UnboundedReceiver<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.resize_subs.lock().unwrap().push(tx);
        rx
    }
}

/// A transport and view sharing one journal.
pub(crate) fn pair() -> (Arc<MockTransport>, Arc<MockView>, Journal) {
    let journal = Journal::default();
    (
        Arc::new(MockTransport::new(journal.clone())),
        Arc::new(MockView::new(journal.clone())),
        journal,
    )
}

/// Let spawned tasks make progress under a paused clock.
pub(crate) async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
