//! Session identity: liveness state, last measured geometry, cancellation.
//!
//! A `Session` is owned by the lifecycle controller. Every other component
//! holds a cloneable `SessionHandle`, which can observe the session and
//! request the two transitions that originate outside the controller
//! (end-of-stream and read-failure exhaustion).

use std::sync::{Arc, Mutex};

use termlink_common::{BridgeEvent, EventBus, Geometry, SessionId, SessionState};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::permit::ReadPermit;

struct Shared {
    id: SessionId,
    state: watch::Sender<SessionState>,
    geometry: Mutex<Option<Geometry>>,
    cancel: CancellationToken,
    events: EventBus,
}

impl Shared {
    /// Apply `next` if it is a legal move from the current state.
    ///
    /// Entering a final state cancels the session token.
    fn transition(&self, next: SessionState) -> bool {
        let mut from = None;
        self.state.send_if_modified(|current| {
            if current.can_transition_to(&next) {
                from = Some(std::mem::replace(current, next.clone()));
                true
            } else {
                false
            }
        });

        let Some(from) = from else {
            tracing::debug!(
                session = %self.id,
                current = %*self.state.borrow(),
                requested = %next,
                "ignored state transition"
            );
            return false;
        };

        tracing::info!(session = %self.id, from = %from, to = %next, "session state changed");
        self.events.publish(BridgeEvent::StateChanged(next.clone()));
        if next.is_final() {
            self.cancel.cancel();
        }
        true
    }
}

// =============================================================================
// SESSION (OWNED)
// =============================================================================

pub struct Session {
    shared: Arc<Shared>,
}

impl Session {
    /// A new session and its only read permit.
    pub fn open(events: EventBus) -> (Self, ReadPermit) {
        let id = SessionId::new();
        let (state, _) = watch::channel(SessionState::Uninitialized);
        let session = Self {
            shared: Arc::new(Shared {
                id,
                state,
                geometry: Mutex::new(None),
                cancel: CancellationToken::new(),
                events,
            }),
        };
        (session, ReadPermit::new(id))
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub(crate) fn transition(&self, next: SessionState) -> bool {
        self.shared.transition(next)
    }

    pub fn state(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }
}

// =============================================================================
// SESSION HANDLE (SHARED)
// =============================================================================

#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl SessionHandle {
    pub fn id(&self) -> &SessionId {
        &self.shared.id
    }

    pub fn state(&self) -> SessionState {
        self.shared.state.borrow().clone()
    }

    /// Whether `permit` was minted for this session.
    pub fn owns(&self, permit: &ReadPermit) -> bool {
        permit.session_id() == self.id()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    /// Last successfully measured view size.
    pub fn geometry(&self) -> Option<Geometry> {
        match self.shared.geometry.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Store a freshly measured geometry. Returns `true` if it changed.
    pub(crate) fn record_geometry(&self, geometry: Geometry) -> bool {
        let mut guard = match self.shared.geometry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *guard == Some(geometry) {
            return false;
        }
        *guard = Some(geometry);
        drop(guard);
        self.shared
            .events
            .publish(BridgeEvent::GeometryChanged(geometry));
        true
    }

    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    /// Token cancelled on teardown or when the session reaches a final state.
    pub fn cancellation(&self) -> CancellationToken {
        self.shared.cancel.child_token()
    }

    pub(crate) fn cancel(&self) {
        self.shared.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Wait until the session is `Ready`. Returns `false` if it reached a
    /// final state or was torn down first.
    pub async fn wait_until_ready(&self) -> bool {
        let mut rx = self.watch_state();
        tokio::select! {
            biased;
            result = rx.wait_for(|s| s.is_ready() || s.is_final()) => {
                matches!(result.as_deref(), Ok(SessionState::Ready))
            }
            _ = self.shared.cancel.cancelled() => false,
        }
    }

    /// Wait until the session reaches a final state.
    pub async fn wait_until_final(&self) -> SessionState {
        let mut rx = self.watch_state();
        let state = match rx.wait_for(|s| s.is_final()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        state
    }

    /// The backend stream ended.
    pub(crate) fn request_terminated(&self, exit_code: Option<u32>) -> bool {
        self.shared.transition(SessionState::Terminated(exit_code))
    }

    /// Output could not be read too many times in a row.
    pub(crate) fn request_failed(&self, reason: String) -> bool {
        self.shared.transition(SessionState::Failed(reason))
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.shared.id)
            .field("state", &*self.shared.state.borrow())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
