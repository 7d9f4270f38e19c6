//! Scheduler module for running pollers and aggregating their results.

mod poller;
mod publisher;

pub use poller::*;
pub use publisher::*;

use crate::config::MonitorConfig;
use crate::stats::{AggregateSnapshot, StatsTable};

use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Monitor lifecycle errors.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("no targets to monitor")]
    NoTargets,
    #[error("monitor already started")]
    AlreadyStarted,
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("poller failed: {0}")]
    PollerFailed(String),
}

/// Runs one poller per target against a shared statistics table.
pub struct Monitor {
    targets: Vec<String>,
    config: MonitorConfig,
    client: reqwest::Client,
    table: StatsTable,
    publisher: SnapshotPublisher,
    started: AtomicBool,
}

impl Monitor {
    /// Create a monitor with a fresh HTTP client.
    pub fn new(targets: Vec<String>, config: MonitorConfig) -> Result<Self, MonitorError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("status-monitor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(targets, config, client)
    }

    /// Create a monitor that probes through the given client.
    pub fn with_client(
        targets: Vec<String>,
        config: MonitorConfig,
        client: reqwest::Client,
    ) -> Result<Self, MonitorError> {
        if targets.is_empty() {
            return Err(MonitorError::NoTargets);
        }

        let table = StatsTable::new(&targets);
        let publisher = SnapshotPublisher::new(table.snapshot());

        Ok(Self {
            targets,
            config,
            client,
            table,
            publisher,
            started: AtomicBool::new(false),
        })
    }

    /// Poll every target until `cancel` fires.
    ///
    /// Returns once every poller has stopped. A poller that panics stops the
    /// others and is reported as [`MonitorError::PollerFailed`].
    pub async fn start(&self, cancel: CancellationToken) -> Result<(), MonitorError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(MonitorError::AlreadyStarted);
        }

        tracing::info!(
            "Starting monitor with {} targets (interval {:?}, timeout {:?})",
            self.targets.len(),
            self.config.interval,
            self.config.timeout
        );

        let stop = cancel.child_token();
        let mut pollers = JoinSet::new();

        for target in &self.targets {
            let poller = EndpointPoller::new(
                target.clone(),
                self.client.clone(),
                self.table.clone(),
                self.publisher.clone(),
                self.config.interval,
                self.config.timeout,
            );
            pollers.spawn(poller.run(stop.clone()));
        }

        let mut failure = None;
        while let Some(joined) = pollers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Poller terminated abnormally: {}", e);
                if failure.is_none() {
                    failure = Some(MonitorError::PollerFailed(e.to_string()));
                    stop.cancel();
                }
            }
        }

        tracing::info!("All pollers stopped");

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Deep copy of the current statistics.
    pub fn current_snapshot(&self) -> AggregateSnapshot {
        self.table.snapshot()
    }

    /// Receiver for snapshots published after each probe.
    pub fn subscribe(&self) -> watch::Receiver<AggregateSnapshot> {
        self.publisher.subscribe()
    }
}
