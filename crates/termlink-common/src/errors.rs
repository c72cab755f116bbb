use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("config write error: {0}")]
    WriteError(String),
}

/// A single failed round trip across the bridge boundary.
///
/// The reason string is whatever the backend reported and is meant to be
/// shown to a human as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("{0}")]
    Rejected(String),

    #[error("no active session")]
    NoSession,

    #[error("session already exists")]
    AlreadyExists,

    #[error("backend task failed: {0}")]
    Join(String),
}

impl TransportError {
    /// Human-readable reason, suitable for a diagnostic line.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

impl From<String> for TransportError {
    fn from(reason: String) -> Self {
        TransportError::Rejected(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("session creation failed: {0}")]
    SessionCreation(String),

    #[error("read failed: {0}")]
    ReadFailed(TransportError),

    #[error("resize to {rows}x{cols} failed: {source}")]
    ResizeFailed {
        rows: u16,
        cols: u16,
        source: TransportError,
    },

    #[error("input write failed after {attempts} attempts: {source}")]
    InputWriteFailed {
        attempts: u32,
        source: TransportError,
    },

    #[error("input queue full, dropped {bytes} bytes")]
    InputQueueFull { bytes: usize },

    #[error("view error: {0}")]
    View(String),

    #[error("backend close failed: {0}")]
    CloseFailed(TransportError),
}

#[derive(Debug, thiserror::Error)]
pub enum TermlinkError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("input.queue_capacity".into());
        assert_eq!(
            err.to_string(),
            "config validation error: input.queue_capacity"
        );

        let err = ConfigError::WriteError("read-only filesystem".into());
        assert_eq!(err.to_string(), "config write error: read-only filesystem");
    }

    #[test]
    fn transport_error_reason_is_verbatim() {
        let err = TransportError::from("permission denied".to_string());
        assert_eq!(err.reason(), "permission denied");
        assert_eq!(TransportError::NoSession.reason(), "no active session");
    }

    #[test]
    fn bridge_error_display() {
        let err = BridgeError::SessionCreation("permission denied".into());
        assert_eq!(err.to_string(), "session creation failed: permission denied");

        let err = BridgeError::ResizeFailed {
            rows: 24,
            cols: 80,
            source: TransportError::NoSession,
        };
        assert_eq!(err.to_string(), "resize to 24x80 failed: no active session");

        let err = BridgeError::InputWriteFailed {
            attempts: 3,
            source: TransportError::Rejected("broken pipe".into()),
        };
        assert_eq!(
            err.to_string(),
            "input write failed after 3 attempts: broken pipe"
        );

        let err = BridgeError::InputQueueFull { bytes: 5 };
        assert_eq!(err.to_string(), "input queue full, dropped 5 bytes");
    }

    #[test]
    fn termlink_error_from_config() {
        let err: TermlinkError = ConfigError::ParseError("bad toml".into()).into();
        assert!(matches!(err, TermlinkError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn termlink_error_from_bridge_and_transport() {
        let err: TermlinkError = BridgeError::View("closed".into()).into();
        assert!(matches!(err, TermlinkError::Bridge(_)));
        assert_eq!(err.to_string(), "view error: closed");

        let err: TermlinkError = TransportError::AlreadyExists.into();
        assert!(matches!(err, TermlinkError::Transport(_)));
    }

    #[test]
    fn termlink_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: TermlinkError = io_err.into();
        assert!(matches!(err, TermlinkError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }
}
