//! Shared statistics table.

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use super::models::*;
use crate::probe::ProbeResult;

/// Statistics table error types.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StatsError {
    #[error("unknown target: {0}")]
    UnknownTarget(String),
}

struct TableState {
    generation: u64,
    endpoints: BTreeMap<String, EndpointStats>,
}

/// Thread-safe statistics table.
///
/// A single lock guards every row. Critical sections only cover the
/// counter update or the copy, never a probe.
#[derive(Clone)]
pub struct StatsTable {
    state: Arc<RwLock<TableState>>,
}

impl StatsTable {
    /// Create a table with one empty accumulator per target.
    pub fn new<S: AsRef<str>>(targets: &[S]) -> Self {
        let endpoints = targets
            .iter()
            .map(|t| (t.as_ref().to_string(), EndpointStats::new(t.as_ref())))
            .collect();

        Self {
            state: Arc::new(RwLock::new(TableState {
                generation: 0,
                endpoints,
            })),
        }
    }

    /// Fold one probe result into its target's accumulator.
    pub fn update(&self, result: &ProbeResult) -> Result<(), StatsError> {
        let mut state = self.write();

        let stats = state
            .endpoints
            .get_mut(&result.target)
            .ok_or_else(|| StatsError::UnknownTarget(result.target.clone()))?;

        stats.total_requests += 1;
        if result.success {
            stats.success_count += 1;
        }

        stats.min_duration = stats.min_duration.min(result.duration);
        stats.max_duration = stats.max_duration.max(result.duration);
        stats.total_duration = stats.total_duration.saturating_add(result.duration);

        stats.min_payload = stats.min_payload.min(result.payload_size);
        stats.max_payload = stats.max_payload.max(result.payload_size);
        stats.total_payload = stats.total_payload.saturating_add(result.payload_size);

        if result.status > 0 {
            *stats.status_codes.entry(result.status).or_insert(0) += 1;
        }

        state.generation += 1;
        Ok(())
    }

    /// Take a deep copy of the whole table.
    pub fn snapshot(&self) -> AggregateSnapshot {
        let state = self.read();
        AggregateSnapshot {
            generation: state.generation,
            taken_at: Utc::now(),
            endpoints: state.endpoints.clone(),
        }
    }

    // The table only holds plain counters and is consistent between
    // statements, so a poisoned lock is safe to keep using.
    fn read(&self) -> RwLockReadGuard<'_, TableState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TableState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
