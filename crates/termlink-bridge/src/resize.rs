//! Keeps the backend PTY size equal to the view's measured grid.

use std::sync::Arc;

use termlink_common::{BridgeError, Geometry};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::session::SessionHandle;
use crate::transport::Transport;
use crate::view::TerminalView;

pub struct ResizeSynchronizer<T, V> {
    transport: Arc<T>,
    view: Arc<V>,
    session: SessionHandle,
    /// Last geometry the backend accepted.
    last_sent: Option<Geometry>,
}

impl<T: Transport, V: TerminalView> ResizeSynchronizer<T, V> {
    pub fn new(transport: Arc<T>, view: Arc<V>, session: SessionHandle) -> Self {
        Self {
            transport,
            view,
            session,
            last_sent: None,
        }
    }

    pub fn last_sent(&self) -> Option<Geometry> {
        self.last_sent
    }

    /// Measure the view and push the result to the backend if it differs
    /// from what was last accepted. Returns the geometry sent, if any.
    pub async fn sync(&mut self) -> Option<Geometry> {
        let Some(geometry) = self.view.measure_and_fit() else {
            tracing::debug!(session = %self.session.id(), "view not measurable, resize skipped");
            return None;
        };
        self.session.record_geometry(geometry);

        if self.last_sent == Some(geometry) {
            return None;
        }

        match self.transport.resize(geometry).await {
            Ok(()) => {
                tracing::debug!(session = %self.session.id(), %geometry, "pty resized");
                self.last_sent = Some(geometry);
                Some(geometry)
            }
            Err(source) => {
                tracing::warn!(session = %self.session.id(), %geometry, error = %source, "pty resize failed");
                self.session.events().error(BridgeError::ResizeFailed {
                    rows: geometry.rows(),
                    cols: geometry.cols(),
                    source,
                });
                None
            }
        }
    }

    /// Sync on every resize notification until `cancel` fires or the view
    /// stops sending them.
    pub async fn run(mut self, mut resizes: mpsc::UnboundedReceiver<()>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                event = resizes.recv() => {
                    if event.is_none() {
                        break;
                    }
                }
            }
            // Coalesce a burst of notifications into one measurement.
            while resizes.try_recv().is_ok() {}
            self.sync().await;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
