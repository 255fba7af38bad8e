//! Failure-chain dataset the review session works over.
//!
//! A dashboard is one publisher's list of failure chains; each chain carries
//! the ordered logs that led to the failure. The dataset is read from
//! `[dashboard] data_file` when set, otherwise the built-in sample is used.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::schema::DashboardConfig;

const SAMPLE_DASHBOARD: &str = include_str!("../../data/sample-dashboard.json");

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub publisher_name: String,
    pub publisher_id: String,
    #[serde(default)]
    pub chains: Vec<FailureChain>,
}

/// One ad failure and the logs leading up to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureChain {
    pub id: String,
    pub timestamp: String,
    pub failure_type: String,
    pub ad_unit: String,
    pub page_url: String,
    pub revenue_impact: String,
    #[serde(default)]
    pub logs: Vec<LogRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub id: String,
    pub title: String,
    /// `"success"` or `"failed"`.
    pub status: String,
    pub timestamp: String,
    /// Raw payload sent to the summary endpoint.
    #[serde(default)]
    pub data: Value,
    /// Summary shipped with the dataset, used when nothing was fetched.
    #[serde(default)]
    pub summary: String,
}

impl LogRecord {
    pub fn is_failed(&self) -> bool {
        self.status.eq_ignore_ascii_case("failed")
    }
}

impl Dashboard {
    /// Load the dataset selected by `[dashboard]`.
    pub fn load(config: &DashboardConfig) -> Result<Self> {
        if config.data_file.trim().is_empty() {
            Self::sample()
        } else {
            Self::from_file(Path::new(config.data_file.trim()))
        }
    }

    /// The built-in sample dataset.
    pub fn sample() -> Result<Self> {
        serde_json::from_str(SAMPLE_DASHBOARD).context("built-in sample dataset is invalid")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dataset {}", path.display()))
    }

    pub fn find_chain(&self, chain_id: &str) -> Option<&FailureChain> {
        self.chains.iter().find(|c| c.id == chain_id)
    }
}

impl FailureChain {
    pub fn find_log(&self, log_id: &str) -> Option<&LogRecord> {
        self.logs.iter().find(|l| l.id == log_id)
    }

    /// The log that recorded the failure: the last failed one, or the last
    /// log when none is marked failed.
    pub fn failed_log(&self) -> Option<&LogRecord> {
        self.logs
            .iter()
            .rev()
            .find(|l| l.is_failed())
            .or_else(|| self.logs.last())
    }
}

// ---------------------------------------------------------------------------
// Technical details
// ---------------------------------------------------------------------------

/// Technical-details block of a chain, as shown in the alert report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicalDetails {
    pub error_code: String,
    pub error_type: String,
    pub ad_unit: String,
    pub page_load_time: String,
    pub revenue_impact: String,
}

impl TechnicalDetails {
    pub fn from_chain(chain: &FailureChain) -> Self {
        let data = chain.failed_log().map(|l| &l.data);

        let error_code = data
            .and_then(|d| d.pointer("/adRenderMetrics/errorCode"))
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_string();

        let page_load_time = data
            .and_then(|d| d.pointer("/performanceMetrics/pageLoadTime"))
            .and_then(Value::as_u64)
            .map(|ms| format!("{ms}ms"))
            .unwrap_or_else(|| "n/a".to_string());

        Self {
            error_code,
            error_type: chain.failure_type.clone(),
            ad_unit: chain.ad_unit.clone(),
            page_load_time,
            revenue_impact: chain.revenue_impact.clone(),
        }
    }

    /// `(label, value)` pairs in display order.
    pub fn rows(&self) -> [(&'static str, &str); 5] {
        [
            ("Error Code", self.error_code.as_str()),
            ("Error Type", self.error_type.as_str()),
            ("Ad Unit", self.ad_unit.as_str()),
            ("Page Load Time", self.page_load_time.as_str()),
            ("Revenue Impact", self.revenue_impact.as_str()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Render an RFC 3339 timestamp in local time. Unparseable input is
/// returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    format_timestamp_in(raw, &Local)
}

fn format_timestamp_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
