//! Reading `config.toml`.

use std::io::ErrorKind;
use std::path::Path;

use termlink_common::ConfigError;

use super::paths::{create_default_config, default_config_path};
use crate::schema::TermlinkConfig;
use crate::validation;

/// Parse the config at `path`. Missing keys take their defaults.
///
/// A file that parses but fails validation is replaced wholesale by the
/// defaults, with a warning naming every problem.
pub fn load_from_path(path: &Path) -> Result<TermlinkConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::ParseError(format!("{}: {e}", path.display())),
    })?;
    let config: TermlinkConfig =
        toml::from_str(&text).map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

    match validation::validate(&config) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "config loaded");
            Ok(config)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "{e}; using defaults");
            Ok(TermlinkConfig::default())
        }
    }
}

/// Load from the platform config directory, writing a commented template
/// there first if no config exists yet.
pub fn load_default() -> Result<TermlinkConfig, ConfigError> {
    let path = default_config_path()?;
    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            create_default_config(&path)?;
            Ok(TermlinkConfig::default())
        }
        other => other,
    }
}
