//! Alert report: timeline, technical details and recommendations for one
//! failure chain, plus its plain-text and HTML renditions.
//!
//! The timeline is built synchronously from cached summaries, falling back
//! to the summary shipped with each log. Recommendations are fetched
//! afterwards and land in [`RecommendationsState`].

use std::fmt::Write as _;
use std::time::Instant;

use crate::activity::ActivityLog;
use crate::backend::{Backend, Summaries};
use crate::cache::SummaryCache;
use crate::config::schema::PrioritiesConfig;
use crate::dashboard::{Dashboard, FailureChain, TechnicalDetails, format_timestamp};
use crate::recommend::{self, RecommendationDocument, render};
use crate::utils::html::escape;

pub const RECOMMENDATIONS_ERROR: &str = "Failed to generate recommendations. Please try again.";
pub const RECOMMENDATIONS_LOADING: &str = "Generating recommendations...";

pub const COPY_SUCCESS: &str = "Alert copied to clipboard";
pub const COPY_FAILURE: &str = "Failed to copy to clipboard";
pub const SEND_SUCCESS: &str = "Alert email sent successfully";
pub const SEND_FAILURE: &str = "Failed to send email. Please try again.";

const REPORT_STYLE: &str = "\
body { font-family: Arial, sans-serif; line-height: 1.6; }
.section { margin-bottom: 20px; }
.section-title { font-size: 18px; font-weight: bold; margin-bottom: 10px; }
.info-grid { display: grid; grid-template-columns: 1fr 1fr; gap: 10px; }
.timeline-item { margin-bottom: 15px; padding-left: 20px; border-left: 2px solid #e5e7eb; }
.timeline-title { font-weight: bold; }
.timeline-time { color: #666; font-size: 0.9em; }
.timeline-summary { margin-top: 5px; color: #444; }
.recommendations { margin-top: 20px; }
.recommendations li { margin-bottom: 5px; }";

// ---------------------------------------------------------------------------
// Report model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub log_id: String,
    pub title: String,
    /// Display timestamp (local time).
    pub timestamp: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecommendationsState {
    #[default]
    Loading,
    Ready {
        document: RecommendationDocument,
        /// Related failure-chain ids suggested by the backend.
        links: Vec<String>,
    },
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertReport {
    pub chain_id: String,
    pub failure_type: String,
    pub page_url: String,
    pub publisher_name: String,
    pub publisher_id: String,
    pub timeline: Vec<TimelineEntry>,
    pub details: TechnicalDetails,
    pub recommendations: RecommendationsState,
}

impl AlertReport {
    /// Build the report for `chain`. No network access.
    pub fn build(dashboard: &Dashboard, chain: &FailureChain, cache: &SummaryCache) -> Self {
        let timeline = chain
            .logs
            .iter()
            .map(|log| TimelineEntry {
                log_id: log.id.clone(),
                title: log.title.clone(),
                timestamp: format_timestamp(&log.timestamp),
                summary: cache.get(&log.id).unwrap_or(log.summary.as_str()).to_string(),
            })
            .collect();

        Self {
            chain_id: chain.id.clone(),
            failure_type: chain.failure_type.clone(),
            page_url: chain.page_url.clone(),
            publisher_name: dashboard.publisher_name.clone(),
            publisher_id: dashboard.publisher_id.clone(),
            timeline,
            details: TechnicalDetails::from_chain(chain),
            recommendations: RecommendationsState::Loading,
        }
    }

    /// Log title → summary, the body of the recommendations request.
    pub fn summaries(&self) -> Summaries {
        self.timeline
            .iter()
            .map(|e| (e.title.clone(), e.summary.clone()))
            .collect()
    }

    pub fn heading(&self) -> String {
        format!("Alert: {} Detected", self.failure_type)
    }

    pub fn publisher_lines(&self) -> [String; 3] {
        [
            format!("Publisher: {}", self.publisher_name),
            format!("Publisher ID: {}", self.publisher_id),
            format!("Failure Chain: {} ({})", self.chain_id, self.page_url),
        ]
    }

    // -----------------------------------------------------------------------
    // Plain text
    // -----------------------------------------------------------------------

    /// Clipboard rendition of the visible report content.
    pub fn to_plain_text(&self) -> String {
        let timeline = self
            .timeline
            .iter()
            .map(|e| format!("{} ({})\n{}", e.title, e.timestamp, e.summary))
            .collect::<Vec<_>>()
            .join("\n\n");

        let details = self
            .details
            .rows()
            .iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{}\n\n{}\n\nEvent Timeline:\n{}\n\nTechnical Details:\n{}",
            self.heading(),
            self.publisher_lines().join("\n"),
            timeline,
            details
        )
    }

    // -----------------------------------------------------------------------
    // HTML
    // -----------------------------------------------------------------------

    /// The report's content region.
    pub fn content_html(&self) -> String {
        let mut html = String::from("<div class=\"alert-content\">\n");

        let _ = writeln!(
            html,
            "<h3 class=\"section-title\">{}</h3>",
            escape(&self.heading())
        );

        html.push_str("<div class=\"section bg-gray-50\"><div class=\"info-grid\">");
        for line in self.publisher_lines() {
            let _ = write!(html, "<div>{}</div>", escape(&line));
        }
        html.push_str("</div></div>\n");

        html.push_str(
            "<div class=\"section\"><div class=\"section-title\">Event Timeline</div>\
             <div id=\"alert-timeline\">",
        );
        for entry in &self.timeline {
            let _ = write!(
                html,
                "<div class=\"timeline-item\">\
                 <div class=\"timeline-title font-medium\">{}</div>\
                 <div class=\"timeline-time text-gray-500\">{}</div>\
                 <div class=\"timeline-summary summary-placeholder\" data-log-id=\"{}\">{}</div>\
                 </div>",
                escape(&entry.title),
                escape(&entry.timestamp),
                escape(&entry.log_id),
                escape(&entry.summary),
            );
        }
        html.push_str("</div></div>\n");

        html.push_str(
            "<div class=\"section bg-gray-50\"><div class=\"section-title\">Technical Details</div>\
             <div class=\"info-grid\">",
        );
        for (label, value) in self.details.rows() {
            let _ = write!(
                html,
                "<div><span class=\"font-medium\">{}:</span> {}</div>",
                escape(label),
                escape(value)
            );
        }
        html.push_str("</div></div>\n");

        let _ = write!(
            html,
            "<div class=\"section recommendations\"><div class=\"section-title\">Recommended Actions</div>\
             <div id=\"recommended-actions\">{}</div></div>\n",
            recommendations_html(&self.recommendations)
        );

        html.push_str("</div>");
        html
    }

    /// Standalone HTML document posted to the send-alert endpoint.
    pub fn to_html_document(&self, title: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n\
             <style>\n{}\n</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape(title),
            REPORT_STYLE,
            self.content_html()
        )
    }
}

fn recommendations_html(state: &RecommendationsState) -> String {
    match state {
        RecommendationsState::Loading => format!(
            "<p class=\"text-sm text-gray-600\">{}</p>",
            escape(RECOMMENDATIONS_LOADING)
        ),
        RecommendationsState::Failed => format!(
            "<div class=\"text-red-600\">{}</div>",
            escape(RECOMMENDATIONS_ERROR)
        ),
        RecommendationsState::Ready { document, links } => {
            let mut html = render::to_html(document);
            if !links.is_empty() {
                let ids = links.iter().map(|l| escape(l)).collect::<Vec<_>>().join(", ");
                let _ = write!(
                    html,
                    "<p class=\"text-sm text-gray-600 mt-4\">Related failure chains: {ids}</p>"
                );
            }
            html
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

/// Fetch and parse recommendations for the report's timeline.
pub fn fetch_recommendations<B: Backend + ?Sized>(
    report: &AlertReport,
    backend: &B,
    activity: &ActivityLog,
    priorities: &PrioritiesConfig,
) -> RecommendationsState {
    let start = Instant::now();
    match backend.generate_recommendations(&report.summaries()) {
        Ok(reply) => {
            let latency_ms = start.elapsed().as_millis() as u64;
            activity.ok_timed("recommendations_fetched", &report.chain_id, latency_ms);
            RecommendationsState::Ready {
                document: recommend::parse(&reply.recommendations, priorities),
                links: reply.links,
            }
        }
        Err(e) => {
            activity.failed("recommendations_failed", &report.chain_id, &format!("{e:#}"));
            RecommendationsState::Failed
        }
    }
}

// ---------------------------------------------------------------------------
// Send control
// ---------------------------------------------------------------------------

pub const SEND_LABEL: &str = "Send Alert";
pub const SENDING_LABEL: &str = "Sending...";

/// The report's send button.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendControl {
    sending: bool,
}

impl SendControl {
    pub fn is_enabled(&self) -> bool {
        !self.sending
    }

    pub fn label(&self) -> &'static str {
        if self.sending { SENDING_LABEL } else { SEND_LABEL }
    }
}

/// Holds the send control disabled; dropping it re-enables the control.
#[derive(Debug)]
pub struct SendGuard<'a> {
    control: &'a mut SendControl,
}

impl<'a> SendGuard<'a> {
    pub fn engage(control: &'a mut SendControl) -> Self {
        control.sending = true;
        Self { control }
    }

    pub fn control(&self) -> &SendControl {
        self.control
    }
}

impl Drop for SendGuard<'_> {
    fn drop(&mut self) {
        self.control.sending = false;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report(cache: &SummaryCache) -> AlertReport {
        let dash = Dashboard::sample().unwrap();
        let chain = dash.find_chain("FC-2342-123").unwrap();
        AlertReport::build(&dash, chain, cache)
    }

    #[test]
    fn timeline_prefers_cached_summaries() {
        let mut cache = SummaryCache::new();
        cache.set("LOG-98765b", "cached bid summary");
        let report = sample_report(&cache);

        assert_eq!(report.timeline.len(), 5);
        assert_eq!(report.timeline[1].summary, "cached bid summary");
        assert_eq!(
            report.timeline[0].summary,
            "Initial page load detected on desktop Chrome browser with 4G connection"
        );
        assert_eq!(report.recommendations, RecommendationsState::Loading);
    }

    #[test]
    fn summaries_are_keyed_by_title() {
        let report = sample_report(&SummaryCache::new());
        let summaries = report.summaries();
        assert_eq!(summaries.len(), 5);
        assert!(summaries.contains_key("Render Failure"));
    }

    #[test]
    fn plain_text_layout() {
        let report = sample_report(&SummaryCache::new());
        let text = report.to_plain_text();

        assert!(text.starts_with("Alert: Render Failure Detected\n\nPublisher: TechNews Daily\n"));
        assert!(text.contains("\n\nEvent Timeline:\nPage Load ("));
        assert!(text.contains("\n\nTechnical Details:\nError Code: AD_RENDER_FAILURE\n"));
        assert!(text.ends_with("Revenue Impact: $2.45"));
    }

    #[test]
    fn html_document_is_standalone_and_escaped() {
        let mut cache = SummaryCache::new();
        cache.set("LOG-98765a", "<script>x</script>");
        let mut report = sample_report(&cache);
        report.recommendations = RecommendationsState::Failed;

        let html = report.to_html_document("Ad Render Failure Report");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Ad Render Failure Report</title>"));
        assert!(html.contains(".timeline-item {"));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(RECOMMENDATIONS_ERROR));
    }

    #[test]
    fn ready_recommendations_list_links() {
        let document = recommend::parse(
            "## High Priority: 1. Retry creative fetch",
            &PrioritiesConfig::default(),
        );
        let html = recommendations_html(&RecommendationsState::Ready {
            document,
            links: vec!["FC-3542-323".to_string()],
        });
        assert!(html.contains("text-red-600"));
        assert!(html.contains("Related failure chains: FC-3542-323"));
    }

    #[test]
    fn send_guard_restores_control() {
        let mut control = SendControl::default();
        assert_eq!(control.label(), SEND_LABEL);
        {
            let guard = SendGuard::engage(&mut control);
            assert!(!guard.control().is_enabled());
            assert_eq!(guard.control().label(), SENDING_LABEL);
        }
        assert!(control.is_enabled());
        assert_eq!(control.label(), SEND_LABEL);
    }
}
