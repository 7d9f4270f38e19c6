//! Target list validation.

use std::collections::HashSet;
use thiserror::Error;
use url::Url;

/// Reasons a target is rejected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("not a valid URL: {0}")]
    Parse(#[from] url::ParseError),
    #[error("unsupported scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
}

/// A rejected target with its 1-based position on the command line.
#[derive(Debug, PartialEq, Eq)]
pub struct InvalidTarget {
    pub index: usize,
    pub url: String,
    pub error: ValidationError,
}

/// Drop repeated targets, keeping the first occurrence of each.
pub fn dedup_targets(targets: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    targets
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Check that a target is an absolute http(s) URL with a host.
pub fn validate_url(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw)?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(ValidationError::MissingHost),
    }
}

/// Validate every target, returning the ones that failed.
pub fn validate_targets(targets: &[String]) -> Vec<InvalidTarget> {
    targets
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            validate_url(raw).err().map(|error| InvalidTarget {
                index: i + 1,
                url: raw.clone(),
                error,
            })
        })
        .collect()
}
