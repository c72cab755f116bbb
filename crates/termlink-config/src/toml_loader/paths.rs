//! Where termlink keeps its files.

use std::path::{Path, PathBuf};

use termlink_common::ConfigError;

use super::template::default_config_toml;
use crate::toml_writer::write_atomic;

const APP_DIR: &str = "termlink";

fn app_file(name: &str) -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|base| base.join(APP_DIR).join(name))
        .ok_or_else(|| ConfigError::ParseError("no config directory on this platform".into()))
}

/// `<config dir>/termlink/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    app_file("config.toml")
}

/// `<config dir>/termlink/settings.toml`.
pub fn default_settings_path() -> Result<PathBuf, ConfigError> {
    app_file("settings.toml")
}

/// Write the commented template to `path`.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    write_atomic(path, default_config_toml())?;
    tracing::info!(path = %path.display(), "wrote default config");
    Ok(())
}
