//! Terminal I/O bridge between a rendering view and a PTY backend.
//!
//! The backend is reached through the asynchronous [`Transport`] trait; the
//! view through [`TerminalView`]. [`Bridge::start`] connects the two and
//! keeps them in sync:
//!
//! - output is polled once per frame and fed to the view, one read at a time
//! - input is forwarded in order through a bounded queue
//! - the view's grid size is mirrored to the PTY
//! - the session moves through `Starting`, `Ready` and a final state
//!
//! [`LocalTransport`] implements the transport over a PTY in this process.

pub mod bridge;
pub mod forwarder;
pub mod lifecycle;
pub mod local;
pub mod options;
pub mod permit;
pub mod pump;
pub mod resize;
pub mod session;
pub mod transport;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::{Bridge, BridgeHandle, BridgeReport};
pub use forwarder::{ForwarderStats, InputForwarder};
pub use lifecycle::{LifecycleController, INIT_NOTICE};
pub use local::LocalTransport;
pub use options::BridgeOptions;
pub use permit::ReadPermit;
pub use pump::{OutputPump, PumpStats};
pub use resize::ResizeSynchronizer;
pub use session::{Session, SessionHandle};
pub use transport::{ReadOutcome, Transport};
pub use view::TerminalView;
