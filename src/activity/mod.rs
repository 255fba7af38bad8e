//! Activity log: one JSON line per notable review-session event.
//!
//! Records cache hits, backend round-trips (with latency), report copy/send
//! outcomes and aborted operations such as an unknown log id. Writing is
//! best-effort: failures are ignored so logging never interrupts a review.
//!
//! Log file: `~/.alertdesk/activity.jsonl`

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::schema::LoggingConfig;

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: String,
    /// Event name, e.g. `"summary_fetched"` or `"missing_element"`.
    pub event: String,
    /// Log id, chain id or event name the entry is about.
    #[serde(default)]
    pub subject: String,
    #[serde(default = "default_true")]
    pub success: bool,
    /// Backend round-trip time (only set for network calls).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Log handle
// ---------------------------------------------------------------------------

/// Where activity entries go. A disabled log drops everything.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: Option<PathBuf>,
}

impl ActivityLog {
    pub fn from_config(config: &LoggingConfig) -> Self {
        if config.enabled {
            Self {
                path: activity_log_path(),
            }
        } else {
            Self::disabled()
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Log to an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    /// Record a successful event.
    pub fn ok(&self, event: &str, subject: &str) {
        self.record(event, subject, true, None, None);
    }

    /// Record a successful backend call and its latency.
    pub fn ok_timed(&self, event: &str, subject: &str, latency_ms: u64) {
        self.record(event, subject, true, Some(latency_ms), None);
    }

    /// Record a failure with a short reason.
    pub fn failed(&self, event: &str, subject: &str, detail: &str) {
        self.record(event, subject, false, None, Some(detail));
    }

    pub fn record(
        &self,
        event: &str,
        subject: &str,
        success: bool,
        latency_ms: Option<u64>,
        detail: Option<&str>,
    ) {
        let Some(ref path) = self.path else {
            return;
        };

        let entry = ActivityEntry {
            timestamp: Utc::now().to_rfc3339(),
            event: event.to_string(),
            subject: subject.to_string(),
            success,
            latency_ms,
            detail: detail.map(|d| d.to_string()),
        };

        let _ = append_entry(path, &entry);
    }

    /// Read all entries, skipping malformed lines.
    pub fn read_all(&self) -> Vec<ActivityEntry> {
        let Some(ref path) = self.path else {
            return Vec::new();
        };

        let Ok(file) = fs::File::open(path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(|line| line.ok())
            .filter_map(|line| serde_json::from_str::<ActivityEntry>(&line).ok())
            .collect()
    }

    /// The newest `limit` entries, oldest first.
    pub fn read_recent(&self, limit: usize) -> Vec<ActivityEntry> {
        let mut entries = self.read_all();
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
        entries
    }
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_entry(path: &Path, entry: &ActivityEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Return the path to the activity log file.
pub fn activity_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".alertdesk").join("activity.jsonl"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
