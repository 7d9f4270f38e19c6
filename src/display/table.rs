//! Terminal table output.

use colored::{ColoredString, Colorize};
use std::io::Write;
use std::time::Duration;
use tabled::builder::Builder;
use tabled::settings::Style;

use super::{DisplayError, Renderer};
use crate::stats::{AggregateSnapshot, EndpointStats};

const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

const HEADER: [&str; 9] = [
    "URL",
    "Status",
    "Min Duration",
    "Max Duration",
    "Avg Duration",
    "Min Payload",
    "Max Payload",
    "Avg Payload",
    "Status Codes",
];

/// Renders snapshots as a table, one row per target.
pub struct TableRenderer<W> {
    out: W,
    clear_screen: bool,
}

impl TableRenderer<std::io::Stdout> {
    /// Table on stdout, redrawn in place.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout(), true)
    }
}

impl<W: Write + Send> TableRenderer<W> {
    pub fn new(out: W, clear_screen: bool) -> Self {
        Self { out, clear_screen }
    }
}

impl<W: Write + Send> Renderer for TableRenderer<W> {
    fn render(&mut self, snapshot: &AggregateSnapshot) -> Result<(), DisplayError> {
        if self.clear_screen {
            write!(self.out, "{}", CLEAR_SCREEN)?;
        }
        writeln!(self.out, "{}", build_table(snapshot))?;
        writeln!(
            self.out,
            "Updated {} ({} targets, {} probes)",
            snapshot.taken_at.format("%H:%M:%S"),
            snapshot.endpoints.len(),
            snapshot.generation
        )?;
        self.out.flush()?;
        Ok(())
    }
}

/// Build the table text for a snapshot, rows sorted by URL.
pub fn build_table(snapshot: &AggregateSnapshot) -> String {
    let mut builder = Builder::default();
    builder.push_record(HEADER);

    for stats in snapshot.endpoints.values() {
        builder.push_record(row(stats));
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

fn row(stats: &EndpointStats) -> Vec<String> {
    let rate = stats.success_percentage();
    let status = format!("{}/{} {}%", stats.success_count, stats.total_requests, rate);

    vec![
        stats.target.clone(),
        colorize_rate(rate, &status).to_string(),
        stats
            .observed_min_duration()
            .map_or_else(|| "-".to_string(), format_duration),
        if stats.total_requests > 0 {
            format_duration(stats.max_duration)
        } else {
            "-".to_string()
        },
        format_duration(stats.avg_duration()),
        stats
            .observed_min_payload()
            .map_or_else(|| "-".to_string(), |p| p.to_string()),
        stats.max_payload.to_string(),
        stats.avg_payload().to_string(),
        format_status_codes(stats),
    ]
}

fn colorize_rate(rate: u64, text: &str) -> ColoredString {
    match rate {
        90.. => text.green(),
        50.. => text.yellow(),
        _ => text.red(),
    }
}

fn colorize_status_code(code: u16, text: &str) -> ColoredString {
    match code {
        200..=299 => text.green(),
        300..=399 => text.blue(),
        400..=499 => text.yellow(),
        500.. => text.red(),
        _ => text.normal(),
    }
}

fn format_status_codes(stats: &EndpointStats) -> String {
    if stats.status_codes.is_empty() {
        return "NO STATUS CODE".to_string();
    }

    stats
        .status_codes
        .iter()
        .map(|(code, count)| colorize_status_code(*code, &format!("{}:{}", code, count)).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Millisecond precision: `87ms`, `1.204s`.
pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else {
        format!("{}.{:03}s", ms / 1000, ms % 1000)
    }
}
