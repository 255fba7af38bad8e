//! Blocking HTTP implementation of [`Backend`] using `ureq`.
//!
//! One agent is built per process from `[backend]` and reused for every
//! call. With `timeout_ms = 0` no overall timeout is set and the transport
//! defaults apply.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::schema::BackendConfig;

use super::{Backend, RecommendationsReply, Summaries};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryRequest<'a> {
    log_data: &'a Value,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: Option<String>,
}

#[derive(Debug, Serialize)]
struct RecommendationsRequest<'a> {
    summaries: &'a Summaries,
}

#[derive(Debug, Serialize)]
struct SendAlertRequest<'a> {
    html: &'a str,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous backend client.
pub struct HttpBackend {
    base_url: String,
    timeout: Option<Duration>,
    agent: ureq::Agent,
}

impl HttpBackend {
    /// Build a client from the resolved config.
    pub fn from_config(config: &BackendConfig) -> Self {
        let timeout = (config.timeout_ms > 0).then(|| Duration::from_millis(config.timeout_ms));

        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
            agent: builder.build(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the URL for an API path.
    ///
    /// On Windows, "localhost" may resolve to IPv6 (::1) first while the
    /// dashboard server only binds IPv4, so it is pinned to 127.0.0.1.
    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path).replace("://localhost", "://127.0.0.1")
    }

    /// Check whether anything answers at the base URL.
    ///
    /// Any HTTP response counts, including error statuses. Uses a short
    /// 5 s timeout so `alertdesk health` doesn't stall.
    pub fn is_reachable(&self) -> bool {
        let url = self.endpoint("/");
        match self.agent.get(&url).timeout(Duration::from_secs(5)).call() {
            Ok(_) | Err(ureq::Error::Status(..)) => true,
            Err(ureq::Error::Transport(_)) => false,
        }
    }

    fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<ureq::Response> {
        let url = self.endpoint(path);
        let mut request = self.agent.post(&url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        request
            .send_json(body)
            .with_context(|| format!("POST {path} failed"))
    }
}

impl Backend for HttpBackend {
    fn generate_summary(&self, log_data: &Value) -> Result<String> {
        let resp = self.post("/api/generate-summary", &SummaryRequest { log_data })?;
        let parsed: SummaryResponse = resp
            .into_json()
            .context("failed to parse summary response")?;

        parsed
            .summary
            .context("summary response has no `summary` field")
    }

    fn generate_recommendations(&self, summaries: &Summaries) -> Result<RecommendationsReply> {
        let resp = self.post(
            "/api/generate-recommendations",
            &RecommendationsRequest { summaries },
        )?;
        resp.into_json()
            .context("failed to parse recommendations response")
    }

    fn send_alert(&self, html: &str) -> Result<()> {
        self.post("/api/send-alert", &SendAlertRequest { html })?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
