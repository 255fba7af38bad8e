//! Client side of the dashboard backend.
//!
//! Three endpoints are used, all `POST` with JSON bodies:
//!
//! - `/api/generate-summary`: `{ "logData": … }` → `{ "summary": "…" }`
//! - `/api/generate-recommendations`: `{ "summaries": { title: summary } }`
//!   → `{ "recommendations": "…", "links": ["FC-…"] }`
//! - `/api/send-alert`: `{ "html": "…" }` → status only
//!
//! The [`Backend`] trait is the seam the review session talks to;
//! [`http::HttpBackend`] is the real implementation.

pub mod http;

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;

pub use http::HttpBackend;

/// Log title → summary text, as sent to the recommendation endpoint.
pub type Summaries = BTreeMap<String, String>;

/// Body of a successful `/api/generate-recommendations` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecommendationsReply {
    /// Raw recommendation text, parsed by [`crate::recommend::parse`].
    pub recommendations: String,
    /// Ids of historical failure chains the backend considers related.
    #[serde(default)]
    pub links: Vec<String>,
}

/// Operations the review session needs from the backend.
///
/// Every error (transport failure, non-2xx status, malformed body) is
/// reported as `Err`; callers decide how to surface it.
pub trait Backend {
    /// Generate a natural-language summary for one log's data payload.
    fn generate_summary(&self, log_data: &Value) -> Result<String>;

    /// Generate prioritized recommendations from the chain's summaries.
    fn generate_recommendations(&self, summaries: &Summaries) -> Result<RecommendationsReply>;

    /// Deliver a standalone HTML report.
    fn send_alert(&self, html: &str) -> Result<()>;
}
