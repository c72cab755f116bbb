//! Bridge tuning: frame pacing, input queue, and output retry policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Output pump pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Polls per second (valid range: 1-240).
    pub frame_rate: u32,
    /// Upper bound on bytes delivered by one poll (valid range: 4096-1048576).
    pub max_output_per_frame: u32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            max_output_per_frame: 65_536,
        }
    }
}

impl PerformanceConfig {
    /// Time between two rendering opportunities.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.frame_rate.max(1)))
    }
}

/// Input forwarding queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Pending input events held before new ones are rejected (valid range: 1-65536).
    pub queue_capacity: u32,
    /// Extra attempts after a failed write (valid range: 0-10).
    pub write_retries: u32,
    /// Backoff unit between write attempts, multiplied by the attempt number
    /// (valid range: 0-5000).
    pub retry_backoff_ms: u32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            write_retries: 2,
            retry_backoff_ms: 10,
        }
    }
}

impl InputConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(u64::from(self.retry_backoff_ms))
    }
}

/// Output read failure policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Consecutive read failures after which the session is marked failed.
    /// `0` keeps retrying forever (valid range: 0-100000).
    pub read_failure_limit: u32,
    /// Cap on the delay between retries after read failures (valid range: 1-60000).
    pub max_backoff_ms: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            read_failure_limit: 0,
            max_backoff_ms: 1000,
        }
    }
}

impl OutputConfig {
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(u64::from(self.max_backoff_ms))
    }
}
