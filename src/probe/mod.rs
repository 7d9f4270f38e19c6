//! Probe module for endpoint monitoring.
//!
//! A probe is a single HTTP GET against one target, bounded by a timeout.
//! Its outcome is normalized into a [`ProbeResult`] whatever happened on the
//! wire, so callers never branch on transport errors.

mod http;

pub use http::*;

use std::time::Duration;
use thiserror::Error;

/// Probe error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("network error: {0}")]
    Network(String),
}

/// Normalized outcome of one probe.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub target: String,
    pub duration: Duration,
    /// Body size in bytes, 0 when no body was read.
    pub payload_size: u64,
    /// HTTP status code, 0 when no response was received.
    pub status: u16,
    pub success: bool,
    pub error: Option<ProbeError>,
}

impl ProbeResult {
    /// A probe that received a response with the given status.
    pub fn completed(target: &str, duration: Duration, status: u16, payload_size: u64) -> Self {
        Self {
            target: target.to_string(),
            duration,
            payload_size,
            status,
            success: is_success_status(status),
            error: None,
        }
    }

    /// A probe that never received a response.
    pub fn failed(target: &str, duration: Duration, error: ProbeError) -> Self {
        Self {
            target: target.to_string(),
            duration,
            payload_size: 0,
            status: 0,
            success: false,
            error: Some(error),
        }
    }
}

/// 2xx and 3xx count as up.
pub fn is_success_status(status: u16) -> bool {
    (200..400).contains(&status)
}
