//! Validation for terminal, performance, input, and output sections.

use crate::schema::TermlinkConfig;

use super::helpers::validate_range;

pub(crate) fn validate_terminal(errors: &mut Vec<String>, config: &TermlinkConfig) {
    validate_range(errors, "terminal.rows", config.terminal.rows.into(), 1, 500);
    validate_range(errors, "terminal.cols", config.terminal.cols.into(), 1, 500);
    if config.terminal.term.trim().is_empty() {
        errors.push("terminal.term must not be empty".into());
    }
}

pub(crate) fn validate_performance(errors: &mut Vec<String>, config: &TermlinkConfig) {
    validate_range(
        errors,
        "performance.frame_rate",
        config.performance.frame_rate,
        1,
        240,
    );
    validate_range(
        errors,
        "performance.max_output_per_frame",
        config.performance.max_output_per_frame,
        4_096,
        1_048_576,
    );
}

pub(crate) fn validate_input(errors: &mut Vec<String>, config: &TermlinkConfig) {
    validate_range(
        errors,
        "input.queue_capacity",
        config.input.queue_capacity,
        1,
        65_536,
    );
    validate_range(errors, "input.write_retries", config.input.write_retries, 0, 10);
    validate_range(
        errors,
        "input.retry_backoff_ms",
        config.input.retry_backoff_ms,
        0,
        5_000,
    );
}

pub(crate) fn validate_output(errors: &mut Vec<String>, config: &TermlinkConfig) {
    validate_range(
        errors,
        "output.read_failure_limit",
        config.output.read_failure_limit,
        0,
        100_000,
    );
    validate_range(
        errors,
        "output.max_backoff_ms",
        config.output.max_backoff_ms,
        1,
        60_000,
    );
}
