//! Terminal grid configuration types.

use serde::{Deserialize, Serialize};

/// Value of `$TERM` handed to the shell.
pub fn default_term() -> String {
    if cfg!(target_os = "windows") {
        "cygwin".into()
    } else {
        "xterm-256color".into()
    }
}

/// Terminal grid settings.
///
/// `rows`/`cols` are only used until the view reports its real size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Fallback row count (valid range: 1-500).
    pub rows: u16,
    /// Fallback column count (valid range: 1-500).
    pub cols: u16,
    pub term: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            rows: 24,
            cols: 80,
            term: default_term(),
        }
    }
}
