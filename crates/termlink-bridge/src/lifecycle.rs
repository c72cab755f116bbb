//! Session lifecycle: announce, create the shell, settle into a state.

use std::sync::Arc;

use termlink_common::{BridgeError, SessionState};

use crate::session::{Session, SessionHandle};
use crate::transport::Transport;
use crate::view::TerminalView;

/// Status line shown while the backend shell is being created.
pub const INIT_NOTICE: &str = "Initializing terminal...";

/// Diagnostic line shown when the backend refuses to create the shell.
pub fn creation_error_line(reason: &str) -> String {
    format!("Error creating shell: {reason}")
}

pub struct LifecycleController<T, V> {
    transport: Arc<T>,
    view: Arc<V>,
    session: Session,
}

impl<T: Transport, V: TerminalView> LifecycleController<T, V> {
    pub fn new(transport: Arc<T>, view: Arc<V>, session: Session) -> Self {
        Self {
            transport,
            view,
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Show the startup notice and move to `Starting`.
    pub fn announce(&self) {
        self.view.writeln(INIT_NOTICE);
        self.session.transition(SessionState::Starting);
    }

    /// Ask the backend for a shell and settle on `Ready` or `Failed`.
    ///
    /// There is no automatic retry. A failure cancels the session so the
    /// rest of the bridge stops making session-dependent calls.
    pub async fn create(&self) -> Result<(), BridgeError> {
        if self.session.state() == SessionState::Uninitialized {
            self.announce();
        }
        let handle = self.session.handle();

        match self.transport.create_session().await {
            Ok(()) => {
                if !self.session.transition(SessionState::Ready) {
                    tracing::debug!(session = %handle.id(), state = %handle.state(), "shell created after session ended");
                }
                Ok(())
            }
            Err(e) => {
                let reason = e.reason();
                tracing::error!(session = %handle.id(), error = %reason, "shell creation failed");
                self.view.writeln(&creation_error_line(&reason));
                self.session.transition(SessionState::Failed(reason.clone()));
                let err = BridgeError::SessionCreation(reason);
                handle.events().error(err.clone());
                Err(err)
            }
        }
    }

    /// Mark a torn-down session as terminated if nothing else ended it.
    pub fn teardown(&self) {
        let handle: SessionHandle = self.session.handle();
        if !self.session.state().is_final() {
            self.session.transition(SessionState::Terminated(None));
        }
        handle.cancel();
    }
}

// =============================================================================
// TESTS
// =============================================================================
