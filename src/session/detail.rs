//! Log detail panel and the summary retrieval flow.
//!
//! Opening a log renders its header and payload, then fills the summary
//! area: from the cache when possible, otherwise with one backend call.
//! A failed call shows [`SUMMARY_ERROR`] and leaves the cache alone, so the
//! next open of the same log retries.

use std::time::Instant;

use crate::activity::ActivityLog;
use crate::backend::Backend;
use crate::cache::SummaryCache;
use crate::dashboard::LogRecord;
use crate::view::View;

pub const SUMMARY_ERROR: &str = "Error generating summary. Please try again.";

/// State of the summary area of the detail panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SummaryState {
    #[default]
    Idle,
    Loading,
    Success(String),
    Failed,
}

impl SummaryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Text shown in the summary area. Empty while idle or loading.
    pub fn text(&self) -> &str {
        match self {
            Self::Idle | Self::Loading => "",
            Self::Success(summary) => summary,
            Self::Failed => SUMMARY_ERROR,
        }
    }
}

/// The open detail panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPanel {
    pub log_id: String,
    pub state: SummaryState,
}

/// Open `log` in the detail panel and resolve its summary.
pub fn open<B, V>(
    log: &LogRecord,
    cache: &mut SummaryCache,
    backend: &B,
    activity: &ActivityLog,
    view: &mut V,
) -> DetailPanel
where
    B: Backend + ?Sized,
    V: View + ?Sized,
{
    view.log_detail(log);

    let state = retrieve_summary(log, cache, backend, activity, view);
    view.summary(&state);

    DetailPanel {
        log_id: log.id.clone(),
        state,
    }
}

fn retrieve_summary<B, V>(
    log: &LogRecord,
    cache: &mut SummaryCache,
    backend: &B,
    activity: &ActivityLog,
    view: &mut V,
) -> SummaryState
where
    B: Backend + ?Sized,
    V: View + ?Sized,
{
    if let Some(summary) = cache.get(&log.id) {
        activity.ok("summary_cache_hit", &log.id);
        return SummaryState::Success(summary.to_string());
    }

    view.summary(&SummaryState::Loading);

    let start = Instant::now();
    match backend.generate_summary(&log.data) {
        Ok(summary) => {
            let latency_ms = start.elapsed().as_millis() as u64;
            activity.ok_timed("summary_fetched", &log.id, latency_ms);
            cache.set(log.id.as_str(), summary.as_str());
            SummaryState::Success(summary)
        }
        Err(e) => {
            activity.failed("summary_failed", &log.id, &format!("{e:#}"));
            SummaryState::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_text() {
        assert_eq!(SummaryState::Idle.text(), "");
        assert_eq!(SummaryState::Loading.text(), "");
        assert!(SummaryState::Loading.is_loading());
        assert_eq!(SummaryState::Success("ok".to_string()).text(), "ok");
        assert_eq!(SummaryState::Failed.text(), SUMMARY_ERROR);
    }
}
