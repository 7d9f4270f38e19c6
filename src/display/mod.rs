//! Presentation of statistics snapshots.
//!
//! The display task only ever reads snapshots from the publisher channel; it
//! never calls back into the monitor.

mod table;

pub use table::*;

use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::stats::AggregateSnapshot;

/// Display error types.
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Something that can present a snapshot.
pub trait Renderer: Send {
    fn render(&mut self, snapshot: &AggregateSnapshot) -> Result<(), DisplayError>;
}

/// Drives a renderer from the snapshot channel.
pub struct Display<R> {
    renderer: R,
    snapshots: watch::Receiver<AggregateSnapshot>,
}

impl<R: Renderer> Display<R> {
    pub fn new(renderer: R, snapshots: watch::Receiver<AggregateSnapshot>) -> Self {
        Self {
            renderer,
            snapshots,
        }
    }

    /// Render every new snapshot until `cancel` fires or the publisher goes away.
    pub async fn start(&mut self, cancel: CancellationToken) -> Result<(), DisplayError> {
        // Show the empty table straight away
        let initial = self.snapshots.borrow_and_update().clone();
        self.renderer.render(&initial)?;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                changed = self.snapshots.changed() => {
                    if changed.is_err() {
                        tracing::debug!("Snapshot channel closed");
                        break;
                    }
                    // Clone out so the channel lock is not held while writing
                    let snapshot = self.snapshots.borrow_and_update().clone();
                    self.renderer.render(&snapshot)?;
                }
            }
        }

        Ok(())
    }

    pub fn render(&mut self, snapshot: &AggregateSnapshot) -> Result<(), DisplayError> {
        self.renderer.render(snapshot)
    }
}

/// Writes each snapshot as one line of JSON.
pub struct JsonRenderer<W> {
    out: W,
}

impl<W: std::io::Write + Send> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: std::io::Write + Send> Renderer for JsonRenderer<W> {
    fn render(&mut self, snapshot: &AggregateSnapshot) -> Result<(), DisplayError> {
        serde_json::to_writer(&mut self.out, snapshot)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
