use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one bridged session in logs and events.
///
/// Displays as the first 8 hex digits, which is enough to tell sessions
/// apart in a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Uuid::encode_buffer();
        let hex = self.0.simple().encode_lower(&mut buf);
        f.write_str(&hex[..8])
    }
}
