//! The asynchronous call boundary between the bridge and the PTY owner.

use async_trait::async_trait;
use termlink_common::{Geometry, OutputChunk, TransportError};

use crate::permit::ReadPermit;

/// What one `read_output` round trip produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Output since the previous read, possibly empty.
    Data(OutputChunk),
    /// The backend stream ended; the shell is gone.
    Closed { exit_code: Option<u32> },
}

/// Remote operations against one PTY session.
///
/// Every call is a single fallible round trip with no implicit retry.
/// Responses to different operations may complete in any order; repeated
/// calls of the same operation are observed by the backend in call order.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Spawn the shell bound to the PTY.
    async fn create_session(&self) -> Result<(), TransportError>;

    /// Write bytes to the PTY's input side.
    async fn write_input(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Drain whatever the PTY produced since the last call, without waiting
    /// for more. Requires the session's read permit.
    async fn read_output(&self, permit: &mut ReadPermit) -> Result<ReadOutcome, TransportError>;

    /// Inform the PTY of a new window size.
    async fn resize(&self, geometry: Geometry) -> Result<(), TransportError>;

    /// Kill the shell on teardown.
    async fn close_session(&self) -> Result<(), TransportError> {
        Ok(())
    }
}
