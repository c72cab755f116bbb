//! Serialize values to TOML files without leaving half-written files behind.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use termlink_common::ConfigError;

fn write_err(path: &Path, e: impl std::fmt::Display) -> ConfigError {
    ConfigError::WriteError(format!("{}: {e}", path.display()))
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize `value` as pretty TOML and write it to `path` atomically.
pub fn save_toml<T: Serialize>(value: &T, path: &Path) -> Result<(), ConfigError> {
    let text = toml::to_string_pretty(value).map_err(|e| write_err(path, e))?;
    write_atomic(path, &text)?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "saved");
    Ok(())
}

/// Write through a `<name>.tmp` sibling and rename it over `path`,
/// creating missing parent directories.
///
/// Where rename can't replace an existing file the contents are written in
/// place instead.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
    }

    let tmp = tmp_sibling(path);
    fs::write(&tmp, contents).map_err(|e| write_err(&tmp, e))?;

    if let Err(e) = fs::rename(&tmp, path) {
        tracing::warn!(path = %path.display(), error = %e, "rename failed, writing in place");
        let direct = fs::write(path, contents).map_err(|e| write_err(path, e));
        let _ = fs::remove_file(&tmp);
        direct?;
    }
    Ok(())
}
