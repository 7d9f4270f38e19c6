//! Command line interface.

use clap::{CommandFactory, Parser};
use std::time::Duration;

use crate::config::parse_secs;

/// Continuously probe HTTP endpoints and show live statistics.
#[derive(Parser, Debug)]
#[command(name = "status-monitor", version, about)]
pub struct Cli {
    /// URLs to monitor (http or https)
    #[arg(value_name = "URL", required = true)]
    pub urls: Vec<String>,

    /// Seconds between probes of each URL [env: STATUS_MONITOR_INTERVAL_SECS]
    #[arg(long, value_name = "SECS", value_parser = parse_secs)]
    pub interval: Option<Duration>,

    /// Per-probe timeout in seconds [env: STATUS_MONITOR_TIMEOUT_SECS]
    #[arg(long, value_name = "SECS", value_parser = parse_secs)]
    pub timeout: Option<Duration>,

    /// Emit snapshots as JSON lines instead of a table
    #[arg(long)]
    pub json: bool,
}

/// One-line usage text.
pub fn usage() -> String {
    Cli::command().render_usage().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_urls_and_flags() {
        let cli = Cli::try_parse_from([
            "status-monitor",
            "--interval",
            "2.5",
            "http://a.test",
            "https://b.test",
        ])
        .unwrap();

        assert_eq!(cli.urls, vec!["http://a.test", "https://b.test"]);
        assert_eq!(cli.interval, Some(Duration::from_millis(2500)));
        assert_eq!(cli.timeout, None);
        assert!(!cli.json);
    }

    #[test]
    fn test_usage_names_binary() {
        assert!(usage().contains("status-monitor"));
    }

    #[test]
    fn test_urls_are_required() {
        assert!(Cli::try_parse_from(["status-monitor"]).is_err());
    }

    #[test]
    fn test_rejects_non_positive_timeout() {
        assert!(Cli::try_parse_from(["status-monitor", "--timeout", "0", "http://a.test"]).is_err());
    }
}
