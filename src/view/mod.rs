//! Presentation layer for the review session.
//!
//! [`View`] is everything the session can show; [`TerminalView`] renders it
//! as colored text. Write errors on the output stream are ignored, the same
//! way a closed pipe would silently stop a `println!`-based report.

use std::io::{self, Write};

use colored::Colorize;

use crate::dashboard::{Dashboard, FailureChain, LogRecord, format_timestamp};
use crate::recommend::render;
use crate::session::alert::{
    AlertReport, RECOMMENDATIONS_ERROR, RECOMMENDATIONS_LOADING, RecommendationsState,
    SendControl,
};
use crate::session::detail::SummaryState;

pub trait View {
    /// Failure-chain table; the `selected` row is highlighted.
    fn chain_table(&mut self, dashboard: &Dashboard, selected: Option<&str>);
    /// Chain details with one card per log.
    fn chain_details(&mut self, dashboard: &Dashboard, chain: &FailureChain);
    /// Detail panel header and payload for a log.
    fn log_detail(&mut self, log: &LogRecord);
    /// Summary area of the detail panel.
    fn summary(&mut self, state: &SummaryState);
    /// Alert report without its recommendations.
    fn alert_report(&mut self, report: &AlertReport);
    /// Recommendations area of the alert report.
    fn recommendations(&mut self, state: &RecommendationsState);
    fn send_control(&mut self, control: &SendControl);
    fn alert_closed(&mut self);
    /// Transient notification.
    fn toast(&mut self, message: &str);
    /// Informational line that is not part of any panel.
    fn notice(&mut self, message: &str);
}

// ---------------------------------------------------------------------------
// Terminal view
// ---------------------------------------------------------------------------

pub struct TerminalView<W: Write> {
    out: W,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: impl std::fmt::Display) {
        let _ = writeln!(self.out, "{text}");
    }
}

impl<W: Write> View for TerminalView<W> {
    fn chain_table(&mut self, dashboard: &Dashboard, selected: Option<&str>) {
        self.line(
            format!(
                "{} ({})",
                dashboard.publisher_name, dashboard.publisher_id
            )
            .bold()
            .cyan(),
        );
        self.line("=".repeat(78));

        if dashboard.chains.is_empty() {
            self.line("No failure chains.".yellow());
            return;
        }

        self.line(format!(
            "  {:<13} {:<19} {:<20} {:<18} {:>8}",
            "Chain", "Time", "Failure", "Ad Unit", "Impact"
        ));
        self.line(format!("  {}", "-".repeat(76)));

        for chain in &dashboard.chains {
            let row = format!(
                "{:<13} {:<19} {:<20} {:<18} {:>8}",
                chain.id,
                format_timestamp(&chain.timestamp),
                truncate(&chain.failure_type, 20),
                truncate(&chain.ad_unit, 18),
                chain.revenue_impact,
            );
            if selected == Some(chain.id.as_str()) {
                self.line(format!("{} {}", "▸".cyan().bold(), row.on_blue().bold()));
            } else {
                self.line(format!("  {row}"));
            }
        }
    }

    fn chain_details(&mut self, dashboard: &Dashboard, chain: &FailureChain) {
        self.line("");
        self.line(format!("Failure Chain {}", chain.id).bold().cyan());
        self.line("=".repeat(50));
        self.line(format!("  {} {}", "Publisher:   ".bold(), dashboard.publisher_name));
        self.line(format!("  {} {}", "Failure:     ".bold(), chain.failure_type.red()));
        self.line(format!("  {} {}", "Ad unit:     ".bold(), chain.ad_unit));
        self.line(format!("  {} {}", "Page:        ".bold(), chain.page_url));
        self.line(format!("  {} {}", "Impact:      ".bold(), chain.revenue_impact));
        self.line("");

        for log in &chain.logs {
            let marker = if log.is_failed() {
                "✗".red().bold()
            } else {
                "✓".green().bold()
            };
            self.line(format!(
                "  {} {:<13} {:<20} {}",
                marker,
                log.id,
                log.title.bold(),
                format_timestamp(&log.timestamp).dimmed()
            ));
        }
    }

    fn log_detail(&mut self, log: &LogRecord) {
        self.line("");
        self.line(format!("Log {}", log.id).bold().cyan());
        self.line(format!("  Timestamp: {}", format_timestamp(&log.timestamp)).dimmed());
        let payload = serde_json::to_string_pretty(&log.data).unwrap_or_default();
        for line in payload.lines() {
            self.line(format!("  {}", line.dimmed()));
        }
    }

    fn summary(&mut self, state: &SummaryState) {
        match state {
            SummaryState::Idle => {}
            SummaryState::Loading => self.line(format!("  {}", "Generating summary...".dimmed())),
            SummaryState::Success(text) => {
                self.line(format!("  {} {}", "Summary:".bold(), text));
            }
            SummaryState::Failed => self.line(format!("  {}", state.text().red())),
        }
    }

    fn alert_report(&mut self, report: &AlertReport) {
        self.line("");
        self.line(report.heading().bold().red());
        self.line("=".repeat(50));
        for line in report.publisher_lines() {
            self.line(format!("  {line}"));
        }

        self.line("");
        self.line("Event Timeline".bold().cyan());
        for entry in &report.timeline {
            self.line(format!(
                "  {} {}",
                entry.title.bold(),
                format!("({})", entry.timestamp).dimmed()
            ));
            self.line(format!("    {}", entry.summary));
        }

        self.line("");
        self.line("Technical Details".bold().cyan());
        for (label, value) in report.details.rows() {
            self.line(format!("  {:<16} {}", format!("{label}:"), value));
        }
    }

    fn recommendations(&mut self, state: &RecommendationsState) {
        self.line("");
        match state {
            RecommendationsState::Loading => self.line(RECOMMENDATIONS_LOADING.dimmed()),
            RecommendationsState::Failed => self.line(RECOMMENDATIONS_ERROR.red()),
            RecommendationsState::Ready { document, links } => {
                let _ = write!(self.out, "{}", render::to_terminal(document));
                if !links.is_empty() {
                    self.line(
                        format!("Related failure chains: {}", links.join(", ")).dimmed(),
                    );
                }
            }
        }
    }

    fn send_control(&mut self, control: &SendControl) {
        if !control.is_enabled() {
            self.line(format!("  {}", control.label().dimmed()));
        }
    }

    fn alert_closed(&mut self) {
        self.line("Alert report closed.".dimmed());
    }

    fn toast(&mut self, message: &str) {
        self.line(format!("{} {}", "»".bold(), message.bold()));
    }

    fn notice(&mut self, message: &str) {
        self.line(message.dimmed());
    }
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SummaryCache;

    fn render(f: impl FnOnce(&mut TerminalView<Vec<u8>>)) -> String {
        colored::control::set_override(false);
        let mut view = TerminalView::new(Vec::new());
        f(&mut view);
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn table_marks_only_selected_row() {
        let dash = Dashboard::sample().unwrap();
        let out = render(|v| v.chain_table(&dash, Some("FC-3542-323")));

        let marked: Vec<&str> = out.lines().filter(|l| l.starts_with('▸')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("FC-3542-323"));
        assert!(out.contains("TechNews Daily (pub-789)"));
    }

    #[test]
    fn summary_states_render() {
        let out = render(|v| {
            v.summary(&SummaryState::Loading);
            v.summary(&SummaryState::Failed);
        });
        assert!(out.contains("Generating summary..."));
        assert!(out.contains("Error generating summary. Please try again."));
    }

    #[test]
    fn report_renders_timeline_and_details() {
        let dash = Dashboard::sample().unwrap();
        let chain = dash.find_chain("FC-2342-123").unwrap();
        let report = AlertReport::build(&dash, chain, &SummaryCache::new());
        let out = render(|v| {
            v.alert_report(&report);
            v.recommendations(&RecommendationsState::Failed);
        });
        assert!(out.contains("Alert: Render Failure Detected"));
        assert!(out.contains("Render Start"));
        assert!(out.contains("AD_RENDER_FAILURE"));
        assert!(out.contains(RECOMMENDATIONS_ERROR));
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("ab", 2), "ab");
    }
}
