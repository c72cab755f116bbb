//! Exclusive read permit.
//!
//! A PTY output stream has no multiplexing, so at most one read may be
//! outstanding per session. `Transport::read_output` takes `&mut ReadPermit`
//! and only a `Session` can mint one, which turns overlapping reads into a
//! borrow error instead of a runtime bug.

use termlink_common::SessionId;

#[derive(Debug)]
pub struct ReadPermit {
    session: SessionId,
}

impl ReadPermit {
    pub(crate) fn new(session: SessionId) -> Self {
        Self { session }
    }

    /// Session this permit reads for.
    pub fn session_id(&self) -> &SessionId {
        &self.session
    }
}
