//! Configuration module for the status monitor.
//!
//! Session constants come from environment variables with sensible
//! defaults, and command line flags override them.

use std::env;
use std::time::Duration;

/// Monitoring session configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Time between probes of one target (default: 5s)
    pub interval: Duration,
    /// Upper bound for a single probe (default: 10s)
    pub timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(10),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STATUS_MONITOR_INTERVAL_SECS`: probe interval in seconds (default: 5)
    /// - `STATUS_MONITOR_TIMEOUT_SECS`: probe timeout in seconds (default: 10)
    ///
    /// Values that are not positive numbers are ignored.
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Some(interval) = env_secs("STATUS_MONITOR_INTERVAL_SECS") {
            cfg.interval = interval;
        }

        if let Some(timeout) = env_secs("STATUS_MONITOR_TIMEOUT_SECS") {
            cfg.timeout = timeout;
        }

        cfg
    }

    /// Apply command line overrides on top of the loaded values.
    pub fn with_overrides(mut self, interval: Option<Duration>, timeout: Option<Duration>) -> Self {
        if let Some(interval) = interval {
            self.interval = interval;
        }
        if let Some(timeout) = timeout {
            self.timeout = timeout;
        }
        self
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    let raw = env::var(key).ok()?;
    match parse_secs(&raw) {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::warn!("Ignoring {}: {}", key, e);
            None
        }
    }
}

/// Parse a positive number of seconds, fractions allowed.
pub fn parse_secs(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", raw))?;

    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("'{}' must be a positive number of seconds", raw));
    }

    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}
