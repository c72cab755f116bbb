//! Which shell the PTY runs, and how.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `[shell]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Program to run. Empty picks the platform default shell.
    pub program: String,
    pub args: Vec<String>,
    /// Start directory; `None` inherits ours.
    pub working_directory: Option<String>,
    /// Added to the sanitized environment, overriding inherited values.
    pub env: BTreeMap<String, String>,
    /// Pass `-l` so the shell reads its login profile (Unix only).
    pub login_shell: bool,
}
