//! Snapshot publication to consumers.

use std::sync::Arc;
use tokio::sync::watch;

use crate::stats::AggregateSnapshot;

/// Outbound channel carrying the newest table snapshot.
///
/// Publishing never waits for a consumer. The channel only holds the latest
/// value, and a snapshot older than the one already held is discarded, so a
/// slow consumer skips intermediate snapshots but never goes backwards.
#[derive(Clone)]
pub struct SnapshotPublisher {
    tx: Arc<watch::Sender<AggregateSnapshot>>,
}

impl SnapshotPublisher {
    pub fn new(initial: AggregateSnapshot) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Offer a snapshot. Returns whether it replaced the held one.
    pub fn publish(&self, snapshot: AggregateSnapshot) -> bool {
        self.tx.send_if_modified(|current| {
            if snapshot.generation > current.generation {
                *current = snapshot;
                true
            } else {
                false
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<AggregateSnapshot> {
        self.tx.subscribe()
    }
}
