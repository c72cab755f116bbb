//! Runtime tuning for one bridge, derived from `TermlinkConfig`.

use std::time::Duration;

use termlink_config::schema::TermlinkConfig;

/// Default capacity of the bridge event bus.
pub const EVENT_BUS_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct BridgeOptions {
    /// Time between two output polls.
    pub frame_interval: Duration,
    /// Cap on the delay between polls after consecutive read failures.
    pub max_backoff: Duration,
    /// Consecutive read failures before the session is failed. `0` = never.
    pub read_failure_limit: u32,
    pub input_queue_capacity: usize,
    pub write_retries: u32,
    pub retry_backoff: Duration,
    pub event_capacity: usize,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self::from(&TermlinkConfig::default())
    }
}

impl From<&TermlinkConfig> for BridgeOptions {
    fn from(config: &TermlinkConfig) -> Self {
        Self {
            frame_interval: config.performance.frame_interval(),
            max_backoff: config.output.max_backoff(),
            read_failure_limit: config.output.read_failure_limit,
            input_queue_capacity: (config.input.queue_capacity as usize).max(1),
            write_retries: config.input.write_retries,
            retry_backoff: config.input.retry_backoff(),
            event_capacity: EVENT_BUS_CAPACITY,
        }
    }
}
