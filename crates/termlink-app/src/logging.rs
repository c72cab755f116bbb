//! Tracing subscriber setup.
//!
//! The session view owns the terminal, so logs default to a file in the
//! local data directory. Stderr is used when file logging is off or the
//! file can't be opened.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use termlink_config::schema::LogLevel;
use tracing_subscriber::EnvFilter;

/// Filter from the CLI override, then `RUST_LOG`, then the config level.
pub fn filter(cli_level: Option<&str>, config_level: LogLevel) -> EnvFilter {
    if let Some(level) = cli_level {
        match EnvFilter::try_new(level) {
            Ok(filter) => return filter,
            Err(e) => eprintln!("termlink: ignoring invalid --log-level '{level}': {e}"),
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level.as_directive()))
}

/// `<data_local_dir>/termlink/termlink.log`.
pub fn log_file_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("termlink").join("termlink.log"))
}

/// Install the global subscriber. Returns the log file path when logging
/// to a file.
pub fn init(filter: EnvFilter, file_logging: bool) -> Option<PathBuf> {
    if file_logging {
        if let Some(path) = log_file_path() {
            let opened = path
                .parent()
                .map_or(Ok(()), std::fs::create_dir_all)
                .and_then(|_| OpenOptions::new().create(true).append(true).open(&path));
            match opened {
                Ok(file) => {
                    tracing_subscriber::fmt()
                        .with_env_filter(filter)
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .init();
                    return Some(path);
                }
                Err(e) => eprintln!("termlink: cannot open log file {}: {e}", path.display()),
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    None
}
