//! Full configuration validation.
//!
//! Each section has its own validator; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod bridge;
mod helpers;


use crate::schema::TermlinkConfig;
use termlink_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &TermlinkConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    bridge::validate_terminal(&mut errors, config);
    bridge::validate_performance(&mut errors, config);
    bridge::validate_input(&mut errors, config);
    bridge::validate_output(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
