//! Configuration schema types for termlink.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod bridge;
mod shell;
mod system;
mod terminal;

pub use bridge::*;
pub use shell::*;
pub use system::*;
pub use terminal::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for termlink.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TermlinkConfig {
    pub shell: ShellConfig,
    pub terminal: TerminalConfig,
    pub performance: PerformanceConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}
