//! Statistics model types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Starting value of `min_duration`; any observation lowers it.
pub const DURATION_SENTINEL: Duration = Duration::MAX;

/// Starting value of `min_payload`; any observation lowers it.
pub const PAYLOAD_SENTINEL: u64 = u64::MAX;

/// Accumulated statistics for a single target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointStats {
    pub target: String,
    pub total_requests: u64,
    pub success_count: u64,
    pub min_duration: Duration,
    pub max_duration: Duration,
    pub total_duration: Duration,
    pub min_payload: u64,
    pub max_payload: u64,
    pub total_payload: u64,
    /// Occurrences per observed status code
    pub status_codes: BTreeMap<u16, u64>,
}

impl EndpointStats {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            total_requests: 0,
            success_count: 0,
            min_duration: DURATION_SENTINEL,
            max_duration: Duration::ZERO,
            total_duration: Duration::ZERO,
            min_payload: PAYLOAD_SENTINEL,
            max_payload: 0,
            total_payload: 0,
            status_codes: BTreeMap::new(),
        }
    }

    pub fn avg_duration(&self) -> Duration {
        if self.total_requests == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total_duration.as_nanos() / u128::from(self.total_requests);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    pub fn avg_payload(&self) -> u64 {
        if self.total_requests == 0 {
            return 0;
        }
        self.total_payload / self.total_requests
    }

    /// Percentage of successful probes, rounded down.
    pub fn success_percentage(&self) -> u64 {
        if self.total_requests == 0 {
            return 0;
        }
        self.success_count * 100 / self.total_requests
    }

    /// Minimum duration, or `None` before the first probe.
    pub fn observed_min_duration(&self) -> Option<Duration> {
        (self.total_requests > 0).then_some(self.min_duration)
    }

    /// Minimum payload, or `None` before the first probe.
    pub fn observed_min_payload(&self) -> Option<u64> {
        (self.total_requests > 0).then_some(self.min_payload)
    }
}

/// A full copy of the statistics table at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateSnapshot {
    /// Number of updates applied to the table when this was taken
    pub generation: u64,
    pub taken_at: DateTime<Utc>,
    pub endpoints: BTreeMap<String, EndpointStats>,
}
