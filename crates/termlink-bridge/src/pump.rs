//! Output pump: one read per frame tick, feed, repeat.
//!
//! The pump owns the session's read permit, so there is never more than one
//! `read_output` in flight, and it awaits the view's feed before the next
//! tick is taken. Empty chunks are skipped but the cycle still repeats.

use std::sync::Arc;
use std::time::Duration;

use termlink_common::BridgeError;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::permit::ReadPermit;
use crate::session::SessionHandle;
use crate::transport::{ReadOutcome, Transport};
use crate::view::TerminalView;

/// Counters reported when the pump stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub cycles: u64,
    pub chunks_fed: u64,
    pub bytes_fed: u64,
    pub empty_reads: u64,
    pub read_failures: u64,
}

pub struct OutputPump<T, V> {
    transport: Arc<T>,
    view: Arc<V>,
    session: SessionHandle,
    permit: ReadPermit,
    frame_interval: Duration,
    max_backoff: Duration,
    failure_limit: u32,
}

impl<T: Transport, V: TerminalView> OutputPump<T, V> {
    pub fn new(transport: Arc<T>, view: Arc<V>, session: SessionHandle, permit: ReadPermit) -> Self {
        debug_assert!(session.owns(&permit), "read permit belongs to another session");
        Self {
            transport,
            view,
            session,
            permit,
            frame_interval: Duration::from_micros(16_666),
            max_backoff: Duration::from_secs(1),
            failure_limit: 0,
        }
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn max_backoff(mut self, max: Duration) -> Self {
        self.max_backoff = max;
        self
    }

    /// Consecutive read failures that fail the session. `0` never does.
    pub fn failure_limit(mut self, limit: u32) -> Self {
        self.failure_limit = limit;
        self
    }

    /// Delay before the next read after `failures` consecutive failures.
    fn backoff(&self, failures: u32) -> Duration {
        let factor = 1u32.checked_shl(failures.min(16)).unwrap_or(u32::MAX);
        self.frame_interval
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run until `cancel` fires or the backend stream ends.
    pub async fn run(mut self, cancel: CancellationToken) -> PumpStats {
        let mut stats = PumpStats::default();
        let mut ticker = time::interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failures: u32 = 0;

        tracing::debug!(
            session = %self.session.id(),
            interval_us = self.frame_interval.as_micros() as u64,
            "output pump started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            stats.cycles += 1;

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = self.transport.read_output(&mut self.permit) => outcome,
            };

            match outcome {
                Ok(ReadOutcome::Data(chunk)) => {
                    failures = 0;
                    if chunk.is_empty() {
                        stats.empty_reads += 1;
                        continue;
                    }
                    let len = chunk.len() as u64;
                    let fed = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        fed = self.view.feed(chunk) => fed,
                    };
                    match fed {
                        Ok(()) => {
                            stats.chunks_fed += 1;
                            stats.bytes_fed += len;
                        }
                        Err(reason) => {
                            tracing::warn!(session = %self.session.id(), error = %reason, "view feed failed");
                            self.session.events().error(BridgeError::View(reason));
                        }
                    }
                }
                Ok(ReadOutcome::Closed { exit_code }) => {
                    tracing::info!(session = %self.session.id(), ?exit_code, "backend output closed");
                    self.session.request_terminated(exit_code);
                    break;
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    stats.read_failures += 1;
                    tracing::warn!(
                        session = %self.session.id(),
                        error = %e,
                        consecutive = failures,
                        "output read failed"
                    );
                    self.session.events().error(BridgeError::ReadFailed(e.clone()));

                    if self.failure_limit > 0 && failures >= self.failure_limit {
                        self.session.request_failed(format!(
                            "output read failed {failures} times in a row: {}",
                            e.reason()
                        ));
                        break;
                    }

                    let delay = self.backoff(failures);
                    if delay > self.frame_interval {
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => break,
                            _ = time::sleep(delay - self.frame_interval) => {}
                        }
                    }
                }
            }
        }

        tracing::debug!(session = %self.session.id(), ?stats, "output pump stopped");
        stats
    }
}

// =============================================================================
// TESTS
// =============================================================================
