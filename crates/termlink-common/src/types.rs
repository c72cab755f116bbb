use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// GEOMETRY
// =============================================================================

/// Character-grid size of a terminal view. Both dimensions are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGeometry")]
pub struct Geometry {
    rows: u16,
    cols: u16,
}

#[derive(Deserialize)]
struct RawGeometry {
    rows: u16,
    cols: u16,
}

impl TryFrom<RawGeometry> for Geometry {
    type Error = String;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        Geometry::new(raw.rows, raw.cols)
            .ok_or_else(|| format!("invalid geometry {}x{}", raw.rows, raw.cols))
    }
}

impl Geometry {
    /// Returns `None` if either dimension is zero.
    pub fn new(rows: u16, cols: u16) -> Option<Self> {
        if rows == 0 || cols == 0 {
            return None;
        }
        Some(Self { rows, cols })
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }
}

impl fmt::Display for Geometry {
    /// Formats as `COLSxROWS`, the way terminal sizes are usually quoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// Backend output produced by one polling cycle. Empty means "no data yet".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputChunk(Vec<u8>);

impl OutputChunk {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for OutputChunk {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for OutputChunk {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

/// Raw bytes the user produced in the view (keystrokes, paste, escape
/// sequences from the view's own key handling).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent(Vec<u8>);

impl InputEvent {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for InputEvent {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl From<&[u8]> for InputEvent {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

// =============================================================================
// SESSION STATE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Starting,
    Ready,
    Failed(String),
    Terminated(Option<u32>),
}

impl SessionState {
    /// `Failed` and `Terminated` have no outgoing transitions.
    pub fn is_final(&self) -> bool {
        matches!(self, SessionState::Failed(_) | SessionState::Terminated(_))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: &SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Uninitialized, Starting)
                | (Starting, Ready)
                | (Starting, Failed(_))
                | (Starting, Terminated(_))
                | (Ready, Failed(_))
                | (Ready, Terminated(_))
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "uninitialized"),
            SessionState::Starting => write!(f, "starting"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Failed(reason) => write!(f, "failed: {reason}"),
            SessionState::Terminated(Some(code)) => write!(f, "terminated (exit code {code})"),
            SessionState::Terminated(None) => write!(f, "terminated"),
        }
    }
}
