//! Per-target polling loop.

use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::SnapshotPublisher;
use crate::probe::{run_http_probe, ProbeResult};
use crate::stats::StatsTable;

/// Repeating probe, update, publish loop for one target.
pub struct EndpointPoller {
    target: String,
    client: reqwest::Client,
    table: StatsTable,
    publisher: SnapshotPublisher,
    interval: Duration,
    timeout: Duration,
}

impl EndpointPoller {
    pub fn new(
        target: String,
        client: reqwest::Client,
        table: StatsTable,
        publisher: SnapshotPublisher,
        interval: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            target,
            client,
            table,
            publisher,
            interval,
            timeout,
        }
    }

    /// Poll until `cancel` fires.
    ///
    /// The first cycle runs immediately. An in-flight probe is not
    /// interrupted by cancellation; it is bounded by its own timeout.
    pub async fn run(self, cancel: CancellationToken) {
        if cancel.is_cancelled() {
            return;
        }

        tracing::debug!(url = %self.target, "Poller started");
        self.poll_once().await;

        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = interval.tick() => self.poll_once().await,
            }
        }

        tracing::debug!(url = %self.target, "Poller stopped");
    }

    /// Run a single probe, fold it into the table and publish the result.
    pub async fn poll_once(&self) {
        let result = run_http_probe(&self.client, &self.target, self.timeout).await;
        log_result(&result);

        if let Err(e) = self.table.update(&result) {
            tracing::error!("Dropping probe result: {}", e);
            return;
        }

        self.publisher.publish(self.table.snapshot());
    }
}

fn log_result(result: &ProbeResult) {
    match &result.error {
        None if result.success => tracing::debug!(
            url = %result.target,
            status = result.status,
            duration = ?result.duration,
            bytes = result.payload_size,
            "Probe succeeded"
        ),
        None => tracing::warn!(
            url = %result.target,
            status = result.status,
            duration = ?result.duration,
            "Probe returned unsuccessful status"
        ),
        Some(e) => tracing::warn!(
            url = %result.target,
            duration = ?result.duration,
            "Probe failed: {}",
            e
        ),
    }
}
