//! Wires a transport and a view into one running session.
//!
//! `Bridge::start` announces the session, sends the initial geometry, then
//! spawns four tasks that share the session's cancellation token:
//!
//! - lifecycle: creates the shell, then waits for teardown
//! - output pump: frame-paced reads fed into the view
//! - input forwarder: view input to backend writes
//! - resize synchronizer: view resizes to backend resizes

use std::sync::Arc;

use termlink_common::{BridgeError, BridgeEvent, EventBus, Geometry, SessionId, SessionState};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::forwarder::{ForwarderStats, InputForwarder};
use crate::lifecycle::LifecycleController;
use crate::options::BridgeOptions;
use crate::pump::{OutputPump, PumpStats};
use crate::resize::ResizeSynchronizer;
use crate::session::{Session, SessionHandle};
use crate::transport::Transport;
use crate::view::TerminalView;

pub struct Bridge<T, V> {
    transport: Arc<T>,
    view: Arc<V>,
    options: BridgeOptions,
}

impl<T: Transport, V: TerminalView> Bridge<T, V> {
    pub fn new(transport: Arc<T>, view: Arc<V>) -> Self {
        Self {
            transport,
            view,
            options: BridgeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BridgeOptions) -> Self {
        self.options = options;
        self
    }

    /// Start the session. Returns once the initial resize has been issued
    /// and every task is running; shell creation continues in the
    /// background.
    pub async fn start(self) -> BridgeHandle<T> {
        let Self {
            transport,
            view,
            options,
        } = self;

        let events = EventBus::new(options.event_capacity);
        let (session, permit) = Session::open(events.clone());
        let handle = session.handle();
        tracing::info!(session = %handle.id(), "starting bridge");

        let lifecycle = LifecycleController::new(transport.clone(), view.clone(), session);
        lifecycle.announce();

        // Subscribe before anything can emit.
        let input = view.subscribe_input();
        let resizes = view.subscribe_resize();

        let mut resize = ResizeSynchronizer::new(transport.clone(), view.clone(), handle.clone());
        resize.sync().await;

        let lifecycle_task = {
            let cancel = handle.cancellation();
            tokio::spawn(async move {
                // Failure is already reported and reflected in the state.
                let _ = lifecycle.create().await;
                cancel.cancelled().await;
                lifecycle.teardown();
            })
        };

        let pump_task = tokio::spawn(
            OutputPump::new(transport.clone(), view.clone(), handle.clone(), permit)
                .frame_interval(options.frame_interval)
                .max_backoff(options.max_backoff)
                .failure_limit(options.read_failure_limit)
                .run(handle.cancellation()),
        );

        let forwarder_task = tokio::spawn(
            InputForwarder::new(transport.clone(), handle.clone())
                .queue_capacity(options.input_queue_capacity)
                .retries(options.write_retries, options.retry_backoff)
                .run(input, handle.cancellation()),
        );

        let resize_task = tokio::spawn(resize.run(resizes, handle.cancellation()));

        BridgeHandle {
            transport,
            session: handle,
            events,
            lifecycle: lifecycle_task,
            pump: pump_task,
            forwarder: forwarder_task,
            resize: resize_task,
        }
    }
}

// =============================================================================
// HANDLE
// =============================================================================

/// What a finished bridge did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeReport {
    pub final_state: SessionState,
    pub pump: PumpStats,
    pub forwarder: ForwarderStats,
}

pub struct BridgeHandle<T> {
    transport: Arc<T>,
    session: SessionHandle,
    events: EventBus,
    lifecycle: JoinHandle<()>,
    pump: JoinHandle<PumpStats>,
    forwarder: JoinHandle<ForwarderStats>,
    resize: JoinHandle<()>,
}

impl<T: Transport> BridgeHandle<T> {
    pub fn session_id(&self) -> &SessionId {
        self.session.id()
    }

    /// Current state, and every later change.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.session.watch_state()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    pub fn geometry(&self) -> Option<Geometry> {
        self.session.geometry()
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Resolve once the session has failed or terminated.
    pub async fn wait_until_finished(&self) -> SessionState {
        self.session.wait_until_final().await
    }

    /// Cancel every task, wait for them, and close the backend session.
    pub async fn shutdown(self) -> BridgeReport {
        tracing::info!(session = %self.session.id(), "shutting down bridge");
        self.session.cancel();

        let pump = join_or_default(self.pump, "output pump").await;
        let forwarder = join_or_default(self.forwarder, "input forwarder").await;
        join_or_default(self.resize, "resize synchronizer").await;
        join_or_default(self.lifecycle, "lifecycle").await;

        if let Err(e) = self.transport.close_session().await {
            tracing::warn!(session = %self.session.id(), error = %e, "closing backend session failed");
            self.events.error(BridgeError::CloseFailed(e));
        }

        let report = BridgeReport {
            final_state: self.session.state(),
            pump,
            forwarder,
        };
        tracing::info!(session = %self.session.id(), state = %report.final_state, "bridge stopped");
        report
    }
}

async fn join_or_default<R: Default>(task: JoinHandle<R>, name: &str) -> R {
    match task.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(task = name, error = %e, "bridge task panicked");
            R::default()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
