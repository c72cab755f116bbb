pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{BridgeError, ConfigError, TermlinkError, TransportError};
pub use events::{BridgeEvent, EventBus};
pub use id::SessionId;
pub use types::{Geometry, InputEvent, OutputChunk, SessionState};

pub type Result<T> = std::result::Result<T, TermlinkError>;
