//! Input forwarder: view input events to `write_input`, in order.
//!
//! Intake never blocks the view. Events go into a bounded queue which a
//! single flush task drains sequentially, so writes reach the backend in
//! emission order. Failed writes are retried a bounded number of times and
//! then reported on the event bus.

use std::sync::Arc;
use std::time::Duration;

use termlink_common::{BridgeError, EventBus, InputEvent, TransportError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::session::SessionHandle;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwarderStats {
    pub written: u64,
    pub bytes_written: u64,
    pub retries: u64,
    pub failed: u64,
    pub dropped: u64,
}

pub struct InputForwarder<T> {
    transport: Arc<T>,
    session: SessionHandle,
    queue_capacity: usize,
    write_retries: u32,
    retry_backoff: Duration,
}

impl<T: Transport> InputForwarder<T> {
    pub fn new(transport: Arc<T>, session: SessionHandle) -> Self {
        Self {
            transport,
            session,
            queue_capacity: 1024,
            write_retries: 2,
            retry_backoff: Duration::from_millis(10),
        }
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Extra attempts after a failed write; the n-th retry waits n × `backoff`.
    pub fn retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.write_retries = retries;
        self.retry_backoff = backoff;
        self
    }

    /// Forward `input` until it closes or `cancel` fires.
    ///
    /// Nothing is written before the session is ready; events typed earlier
    /// wait in the queue. If the session never becomes ready they are
    /// discarded.
    pub async fn run(
        self,
        input: mpsc::UnboundedReceiver<InputEvent>,
        cancel: CancellationToken,
    ) -> ForwarderStats {
        let (queue_tx, queue_rx) = mpsc::channel(self.queue_capacity);
        let events = self.session.events().clone();

        let intake = intake(input, queue_tx, events, cancel.clone());
        let flush = self.flush(queue_rx, cancel);
        let (dropped, mut stats) = tokio::join!(intake, flush);

        stats.dropped = dropped;
        tracing::debug!(?stats, "input forwarder stopped");
        stats
    }

    async fn flush(&self, mut queue: mpsc::Receiver<InputEvent>, cancel: CancellationToken) -> ForwarderStats {
        let mut stats = ForwarderStats::default();

        if !self.session.wait_until_ready().await {
            tracing::debug!(session = %self.session.id(), "session not ready, input discarded");
            queue.close();
            return stats;
        }

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = queue.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            match self.write_with_retry(event.as_bytes(), &cancel, &mut stats).await {
                Ok(()) => {
                    stats.written += 1;
                    stats.bytes_written += event.len() as u64;
                }
                Err(Some((attempts, source))) => {
                    stats.failed += 1;
                    tracing::warn!(
                        session = %self.session.id(),
                        bytes = event.len(),
                        attempts,
                        error = %source,
                        "input write failed"
                    );
                    self.session
                        .events()
                        .error(BridgeError::InputWriteFailed { attempts, source });
                }
                Err(None) => break,
            }
        }

        // Anything still queued belongs to a session that is going away.
        queue.close();
        stats
    }

    /// `Err(None)` means cancelled during a write or a retry wait.
    async fn write_with_retry(
        &self,
        data: &[u8],
        cancel: &CancellationToken,
        stats: &mut ForwarderStats,
    ) -> Result<(), Option<(u32, TransportError)>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let written = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(None),
                written = self.transport.write_input(data) => written,
            };
            let err = match written {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            if attempt > self.write_retries {
                return Err(Some((attempt, err)));
            }

            tracing::debug!(attempt, error = %err, "retrying input write");
            stats.retries += 1;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(None),
                _ = tokio::time::sleep(self.retry_backoff * attempt) => {}
            }
        }
    }
}

/// Move events from the view into the bounded queue. Returns the number of
/// events dropped because the queue was full.
async fn intake(
    mut input: mpsc::UnboundedReceiver<InputEvent>,
    queue: mpsc::Sender<InputEvent>,
    events: EventBus,
    cancel: CancellationToken,
) -> u64 {
    let mut dropped = 0;
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = input.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        match queue.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                dropped += 1;
                tracing::warn!(bytes = event.len(), "input queue full, event dropped");
                events.error(BridgeError::InputQueueFull { bytes: event.len() });
            }
            Err(mpsc::error::TrySendError::Closed(_)) => break,
        }
    }
    dropped
}

// =============================================================================
// TESTS
// =============================================================================
