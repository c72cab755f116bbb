//! Persisted user preferences, kept apart from `config.toml`.
//!
//! The schema is a single bounded field, `font_size`. Values that are out of
//! range or unparsable are ignored on load and the default is used instead.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use termlink_common::ConfigError;
use tracing::{debug, warn};

use crate::toml_loader::default_settings_path;
use crate::toml_writer::save_toml;

// =============================================================================
// SCHEMA
// =============================================================================

pub const MIN_FONT_SIZE: u32 = 8;
pub const MAX_FONT_SIZE: u32 = 32;
pub const DEFAULT_FONT_SIZE: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub font_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl Settings {
    pub fn is_valid(&self) -> bool {
        (MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size)
    }
}

/// Clamp a font size into the supported range.
pub fn clamp_font_size(size: i64) -> u32 {
    size.clamp(i64::from(MIN_FONT_SIZE), i64::from(MAX_FONT_SIZE)) as u32
}

// =============================================================================
// STORE
// =============================================================================

/// File-backed settings store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform default location.
    pub fn open_default() -> Result<Self, ConfigError> {
        Ok(Self::new(default_settings_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored settings, falling back to defaults when the file is
    /// missing, unparsable, or holds an out-of-range value.
    pub fn load(&self) -> Settings {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => {
                debug!(path = %self.path.display(), "no stored settings, using defaults");
                return Settings::default();
            }
        };

        match toml::from_str::<Settings>(&content) {
            Ok(settings) if settings.is_valid() => settings,
            Ok(settings) => {
                warn!(
                    font_size = settings.font_size,
                    "stored font size out of range, using default"
                );
                Settings::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), "failed to parse settings: {e}");
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if !settings.is_valid() {
            return Err(ConfigError::ValidationError(format!(
                "font_size = {} is out of range [{MIN_FONT_SIZE}, {MAX_FONT_SIZE}]",
                settings.font_size
            )));
        }
        save_toml(settings, &self.path)?;
        debug!(path = %self.path.display(), font_size = settings.font_size, "settings saved");
        Ok(())
    }
}
