//! termlink configuration system.
//!
//! TOML-based configuration with validation, plus a small settings store
//! for user preferences that change at runtime. All config sections use
//! sensible defaults so partial configs work out of the box.

pub mod schema;
pub mod settings;
pub mod toml_loader;
pub mod toml_writer;
pub mod validation;

pub use schema::{TermlinkConfig, CONFIG_SCHEMA_VERSION};
pub use settings::{Settings, SettingsStore};
pub use toml_writer::save_toml;

use std::path::Path;

use termlink_common::ConfigError;

/// Load config from an explicit path, or from the platform default path
/// (creating it on first run) when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<TermlinkConfig, ConfigError> {
    let config = match path {
        Some(p) => toml_loader::load_from_path(p)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }

    #[test]
    fn load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[performance]\nframe_rate = 30\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.performance.frame_rate, 30);
    }

    #[test]
    fn load_config_missing_explicit_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
