use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tokio::time::Instant;

use crate::ArcStr;

/// A single entry of the project feed, rendered as one link row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub label: ArcStr,
    pub url: ArcStr,
}

/// Why a fetch attempt produced no project list. Only the short display
/// form ever reaches the screen.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid JSON: {0}")]
    Parse(String),
}

/// The outcome of one load attempt.
///
/// `list` is `None` when the fetch failed; `ts` comes from the response's
/// `Last-Modified` header when present, else the time of the attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedResult {
    pub list: Option<Vec<Project>>,
    pub ts: DateTime<Utc>,
    pub error: Option<String>,
}

/// Short-lived cache of the last successful, non-empty feed result.
///
/// Owned by the feed actor; `set` is only ever called with non-empty lists,
/// so a transient failure can never poison subsequent loads.
#[derive(Debug)]
pub struct FeedCache {
    entry: Option<FeedResult>,
    stamp: Option<Instant>,
    ttl: Duration,
}

impl FeedCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: None,
            stamp: None,
            ttl,
        }
    }

    /// Whether a cached entry exists and is younger than the TTL.
    pub fn is_valid(&self) -> bool {
        match (&self.entry, self.stamp) {
            (Some(_), Some(stamp)) => stamp.elapsed() < self.ttl,
            _ => false,
        }
    }

    /// The cached result, if still valid.
    pub fn get(&self) -> Option<&FeedResult> {
        if self.is_valid() { self.entry.as_ref() } else { None }
    }

    /// Stores a result and stamps it with the current time.
    pub fn set(&mut self, result: FeedResult) {
        self.entry = Some(result);
        self.stamp = Some(Instant::now());
    }

    /// Drops the cached entry, forcing the next fetch to hit the network.
    pub fn clear(&mut self) {
        self.entry = None;
        self.stamp = None;
    }
}

/// Normalizes a heterogeneous JSON payload into a uniform project list.
///
/// Accepted shapes:
/// - an array of objects carrying any of `label`/`url`/`href`; entries with
///   none of the three are dropped, `label` falls back to `url` then `href`,
///   and `url` falls back to `href` then `"#"`;
/// - a flat object mapping labels to URL strings, kept in input order;
/// - anything else yields an empty list.
pub fn normalize_projects(json: &Value) -> Vec<Project> {
    match json {
        Value::Array(items) => items.iter().filter_map(project_from_entry).collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(label, value)| {
                let url = value.as_str()?;
                Some(Project {
                    label: ArcStr::from(label.as_str()),
                    url: ArcStr::from(url),
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn project_from_entry(entry: &Value) -> Option<Project> {
    let entry = entry.as_object()?;
    let label = text_field(entry, "label");
    let url = text_field(entry, "url");
    let href = text_field(entry, "href");

    let resolved_label = label.or(url).or(href)?;
    let resolved_url = url.or(href).unwrap_or("#");

    Some(Project {
        label: ArcStr::from(resolved_label),
        url: ArcStr::from(resolved_url),
    })
}

/// A field only counts when it is a non-empty string, mirroring the
/// truthiness rules of the original payloads in the wild.
fn text_field<'a>(entry: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    entry.get(key)?.as_str().filter(|s| !s.is_empty())
}
