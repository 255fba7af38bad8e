/// Integration tests for the review session.
///
/// The session is driven with an in-memory backend, clipboard and view so
/// every network call, clipboard write and rendered panel can be counted.
use std::cell::{Cell, RefCell};

use alertdesk::activity::ActivityLog;
use alertdesk::backend::{Backend, RecommendationsReply, Summaries};
use alertdesk::config::DeskConfig;
use alertdesk::dashboard::{Dashboard, FailureChain, LogRecord};
use alertdesk::recommend::Priority;
use alertdesk::session::alert::{
    self, AlertReport, RecommendationsState, SendControl, SENDING_LABEL, SEND_LABEL,
};
use alertdesk::session::detail::{SUMMARY_ERROR, SummaryState};
use alertdesk::session::events::{EventKind, Scope, UiEvent};
use alertdesk::session::{Dispatch, ReviewSession};
use alertdesk::utils::clipboard::Clipboard;
use alertdesk::view::View;
use anyhow::{Result, bail};
use serde_json::Value;

const CHAIN: &str = "FC-2342-123";
const OTHER_CHAIN: &str = "FC-3542-323";

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeBackend {
    summary_calls: Cell<usize>,
    recommendation_calls: Cell<usize>,
    fail_summaries: Cell<bool>,
    fail_recommendations: Cell<bool>,
    fail_send: Cell<bool>,
    last_summaries: RefCell<Summaries>,
    sent: RefCell<Vec<String>>,
}

impl Backend for FakeBackend {
    fn generate_summary(&self, _log_data: &Value) -> Result<String> {
        self.summary_calls.set(self.summary_calls.get() + 1);
        if self.fail_summaries.get() {
            bail!("status 500");
        }
        Ok(format!("fresh summary #{}", self.summary_calls.get()))
    }

    fn generate_recommendations(&self, summaries: &Summaries) -> Result<RecommendationsReply> {
        self.recommendation_calls
            .set(self.recommendation_calls.get() + 1);
        *self.last_summaries.borrow_mut() = summaries.clone();
        if self.fail_recommendations.get() {
            bail!("status 502");
        }
        Ok(RecommendationsReply {
            recommendations: "## High Priority: 1. Retry the creative fetch. \
                              Impact: recovers the impression. \
                              ## Low Priority: 1. Add a fallback creative."
                .to_string(),
            links: vec![OTHER_CHAIN.to_string()],
        })
    }

    fn send_alert(&self, html: &str) -> Result<()> {
        self.sent.borrow_mut().push(html.to_string());
        if self.fail_send.get() {
            bail!("status 503");
        }
        Ok(())
    }
}

#[derive(Default)]
struct RecordingClipboard {
    texts: Vec<String>,
    fail: bool,
}

impl Clipboard for RecordingClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        if self.fail {
            bail!("no clipboard");
        }
        self.texts.push(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Shown {
    Table(Option<String>),
    Details(String),
    LogDetail(String),
    Summary(SummaryState),
    Report(String),
    Recommendations(RecommendationsState),
    Send { label: String, enabled: bool },
    Closed,
    Toast(String),
    Notice(String),
}

#[derive(Default)]
struct RecordingView {
    shown: Vec<Shown>,
}

impl RecordingView {
    fn toasts(&self) -> Vec<&str> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Toast(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    fn summaries(&self) -> Vec<&SummaryState> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Summary(state) => Some(state),
                _ => None,
            })
            .collect()
    }
}

impl View for RecordingView {
    fn chain_table(&mut self, _dashboard: &Dashboard, selected: Option<&str>) {
        self.shown.push(Shown::Table(selected.map(str::to_string)));
    }

    fn chain_details(&mut self, _dashboard: &Dashboard, chain: &FailureChain) {
        self.shown.push(Shown::Details(chain.id.clone()));
    }

    fn log_detail(&mut self, log: &LogRecord) {
        self.shown.push(Shown::LogDetail(log.id.clone()));
    }

    fn summary(&mut self, state: &SummaryState) {
        self.shown.push(Shown::Summary(state.clone()));
    }

    fn alert_report(&mut self, report: &AlertReport) {
        self.shown.push(Shown::Report(report.chain_id.clone()));
    }

    fn recommendations(&mut self, state: &RecommendationsState) {
        self.shown.push(Shown::Recommendations(state.clone()));
    }

    fn send_control(&mut self, control: &SendControl) {
        self.shown.push(Shown::Send {
            label: control.label().to_string(),
            enabled: control.is_enabled(),
        });
    }

    fn alert_closed(&mut self) {
        self.shown.push(Shown::Closed);
    }

    fn toast(&mut self, message: &str) {
        self.shown.push(Shown::Toast(message.to_string()));
    }

    fn notice(&mut self, message: &str) {
        self.shown.push(Shown::Notice(message.to_string()));
    }
}

type TestSession = ReviewSession<FakeBackend, RecordingClipboard, RecordingView>;

fn session() -> TestSession {
    ReviewSession::new(
        Dashboard::sample().unwrap(),
        FakeBackend::default(),
        RecordingClipboard::default(),
        RecordingView::default(),
    )
}

fn session_with_clipboard(clipboard: RecordingClipboard) -> TestSession {
    ReviewSession::new(
        Dashboard::sample().unwrap(),
        FakeBackend::default(),
        clipboard,
        RecordingView::default(),
    )
}

// ---------------------------------------------------------------------------
// Summary retrieval
// ---------------------------------------------------------------------------

#[test]
fn first_open_fetches_once_then_uses_cache() {
    let mut s = session();
    assert!(s.select_chain(CHAIN));

    assert!(s.open_log("LOG-98765a"));
    assert_eq!(s.backend().summary_calls.get(), 1);
    assert_eq!(s.cache().get("LOG-98765a"), Some("fresh summary #1"));

    assert!(s.open_log("LOG-98765a"));
    assert_eq!(s.backend().summary_calls.get(), 1);
    assert_eq!(
        s.detail().unwrap().state,
        SummaryState::Success("fresh summary #1".to_string())
    );

    // The miss shows a loading state first; the hit goes straight to the text.
    assert_eq!(
        s.view().summaries(),
        vec![
            &SummaryState::Loading,
            &SummaryState::Success("fresh summary #1".to_string()),
            &SummaryState::Success("fresh summary #1".to_string()),
        ]
    );
}

#[test]
fn failed_fetch_is_not_cached_and_retries() {
    let mut s = session();
    s.select_chain(CHAIN);
    s.backend().fail_summaries.set(true);

    s.open_log("LOG-98765e");
    assert_eq!(s.backend().summary_calls.get(), 1);
    assert!(!s.cache().contains("LOG-98765e"));
    let state = &s.detail().unwrap().state;
    assert_eq!(*state, SummaryState::Failed);
    assert_eq!(state.text(), SUMMARY_ERROR);

    s.backend().fail_summaries.set(false);
    s.open_log("LOG-98765e");
    assert_eq!(s.backend().summary_calls.get(), 2);
    assert!(s.cache().contains("LOG-98765e"));
}

#[test]
fn clearing_the_cache_forces_a_refetch() {
    let mut s = session();
    s.select_chain(CHAIN);
    s.open_log("LOG-98765b");
    assert_eq!(s.cache().len(), 1);

    assert_eq!(s.dispatch(UiEvent::ClearCache), Dispatch::Handled);
    assert!(s.cache().is_empty());

    s.open_log("LOG-98765b");
    assert_eq!(s.backend().summary_calls.get(), 2);
}

#[test]
fn missing_targets_abort_without_network() {
    let mut s = session();
    assert!(!s.open_log("LOG-98765a"));
    assert!(!s.show_alert());
    assert!(!s.copy_alert());
    assert!(!s.send_alert());
    assert!(!s.hide_alert());
    assert!(!s.select_chain("FC-0000-000"));

    s.select_chain(CHAIN);
    assert!(!s.open_log("LOG-43210a"));

    assert_eq!(s.backend().summary_calls.get(), 0);
    assert_eq!(s.backend().recommendation_calls.get(), 0);
    assert!(s.view().toasts().is_empty());
}

// ---------------------------------------------------------------------------
// Event bindings
// ---------------------------------------------------------------------------

#[test]
fn events_need_a_mounted_scope() {
    let mut s = session();
    assert!(s.bindings().is_mounted(Scope::Page));

    assert_eq!(
        s.dispatch(UiEvent::OpenLog("LOG-98765a".to_string())),
        Dispatch::Ignored
    );
    assert_eq!(s.dispatch(UiEvent::ShowAlert), Dispatch::Ignored);
    assert_eq!(s.dispatch(UiEvent::CopyAlert), Dispatch::Ignored);

    assert_eq!(
        s.dispatch(UiEvent::SelectChain(CHAIN.to_string())),
        Dispatch::Handled
    );
    assert!(s.bindings().is_bound(EventKind::OpenLog));
    assert!(!s.bindings().is_bound(EventKind::SendAlert));

    assert_eq!(s.dispatch(UiEvent::ShowAlert), Dispatch::Handled);
    assert!(s.bindings().is_bound(EventKind::SendAlert));

    assert_eq!(s.dispatch(UiEvent::HideAlert), Dispatch::Handled);
    assert!(!s.bindings().is_mounted(Scope::AlertReport));
    assert_eq!(s.dispatch(UiEvent::SendAlert), Dispatch::Ignored);

    assert_eq!(s.dispatch(UiEvent::Quit), Dispatch::Quit);
}

#[test]
fn selecting_another_chain_replaces_details_and_closes_report() {
    let mut s = session();
    s.select_chain(CHAIN);
    s.open_log("LOG-98765a");
    s.show_alert();
    assert!(s.report().is_some());

    s.select_chain(OTHER_CHAIN);
    assert_eq!(s.selected_chain(), Some(OTHER_CHAIN));
    assert!(s.report().is_none());
    assert!(s.detail().is_none());
    assert!(!s.bindings().is_mounted(Scope::AlertReport));
    assert!(s.bindings().is_mounted(Scope::ChainDetails));

    // Logs of the previous chain are gone with its details.
    assert!(!s.open_log("LOG-98765a"));
}

#[test]
fn chain_table_highlights_selection() {
    let mut s = session();
    s.show_chains();
    s.select_chain(OTHER_CHAIN);
    s.show_chains();

    let tables: Vec<&Shown> = s
        .view()
        .shown
        .iter()
        .filter(|e| matches!(e, Shown::Table(_)))
        .collect();
    assert_eq!(
        tables,
        vec![&Shown::Table(None), &Shown::Table(Some(OTHER_CHAIN.to_string()))]
    );
}

// ---------------------------------------------------------------------------
// Alert report
// ---------------------------------------------------------------------------

#[test]
fn alert_uses_cached_summaries_and_parses_recommendations() {
    let mut s = session();
    s.select_chain(CHAIN);
    s.open_log("LOG-98765e");
    let calls_before = s.backend().summary_calls.get();

    assert!(s.show_alert());
    assert_eq!(s.backend().summary_calls.get(), calls_before);
    assert_eq!(s.backend().recommendation_calls.get(), 1);

    let sent = s.backend().last_summaries.borrow().clone();
    assert_eq!(sent.len(), 5);
    assert_eq!(sent["Render Failure"], "fresh summary #1");
    assert_eq!(sent["Bid Start"], "Bid request initiated for 300x250 sidebar ad placement");

    let report = s.report().unwrap();
    let RecommendationsState::Ready { document, links } = &report.recommendations else {
        panic!("expected parsed recommendations");
    };
    assert_eq!(document.sections.len(), 2);
    assert_eq!(document.sections[0].priority, Priority::High);
    assert_eq!(
        document.sections[0].items[0].impact.as_deref(),
        Some("recovers the impression.")
    );
    assert_eq!(document.sections[1].priority, Priority::Low);
    assert_eq!(links, &vec![OTHER_CHAIN.to_string()]);

    // Report first, then the loading state, then the result.
    let shown = &s.view().shown;
    let report_at = shown
        .iter()
        .position(|e| *e == Shown::Report(CHAIN.to_string()))
        .unwrap();
    assert_eq!(
        shown[report_at + 1],
        Shown::Recommendations(RecommendationsState::Loading)
    );
    assert!(matches!(
        shown[report_at + 2],
        Shown::Recommendations(RecommendationsState::Ready { .. })
    ));
}

#[test]
fn recommendation_failure_shows_inline_error() {
    let mut s = session();
    s.select_chain(CHAIN);
    s.backend().fail_recommendations.set(true);

    assert!(s.show_alert());
    assert_eq!(
        s.report().unwrap().recommendations,
        RecommendationsState::Failed
    );
    assert!(
        s.report()
            .unwrap()
            .content_html()
            .contains(alert::RECOMMENDATIONS_ERROR)
    );
    assert!(s.view().toasts().is_empty());
}

#[test]
fn copy_writes_plain_text_report() {
    let mut s = session();
    s.select_chain(CHAIN);
    s.show_alert();

    assert!(s.copy_alert());
    let text = &s.clipboard().texts[0];
    assert!(text.starts_with("Alert: Render Failure Detected\n\n"));
    assert!(text.contains("Event Timeline:\nPage Load ("));
    assert!(text.contains("Technical Details:\nError Code: AD_RENDER_FAILURE"));
    assert_eq!(s.view().toasts(), vec![alert::COPY_SUCCESS]);
}

#[test]
fn copy_failure_is_reported_as_toast() {
    let mut s = session_with_clipboard(RecordingClipboard {
        texts: Vec::new(),
        fail: true,
    });
    s.select_chain(CHAIN);
    s.show_alert();

    assert!(!s.copy_alert());
    assert_eq!(s.view().toasts(), vec![alert::COPY_FAILURE]);
    assert!(s.report().is_some());
}

#[test]
fn send_success_restores_control_and_closes_report() {
    let mut config = DeskConfig::default();
    config.alert.report_title = "Sidebar incident".to_string();
    let mut s = session().with_config(&config);
    s.select_chain(CHAIN);
    s.show_alert();

    assert!(s.send_alert());

    let sent = s.backend().sent.borrow();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("<!DOCTYPE html>"));
    assert!(sent[0].contains("<title>Sidebar incident</title>"));
    assert!(sent[0].contains("class=\"alert-content\""));
    drop(sent);

    let controls: Vec<&Shown> = s
        .view()
        .shown
        .iter()
        .filter(|e| matches!(e, Shown::Send { .. }))
        .collect();
    assert_eq!(
        controls,
        vec![
            &Shown::Send {
                label: SENDING_LABEL.to_string(),
                enabled: false
            },
            &Shown::Send {
                label: SEND_LABEL.to_string(),
                enabled: true
            },
        ]
    );
    assert!(s.send_control().is_enabled());
    assert_eq!(s.view().toasts(), vec![alert::SEND_SUCCESS]);
    assert!(s.report().is_none());
    assert_eq!(s.view().shown.last(), Some(&Shown::Closed));
}

#[test]
fn send_failure_restores_control_and_keeps_report() {
    let mut s = session();
    s.select_chain(CHAIN);
    s.show_alert();
    s.backend().fail_send.set(true);

    assert!(!s.send_alert());
    assert!(s.send_control().is_enabled());
    assert_eq!(s.send_control().label(), SEND_LABEL);
    assert_eq!(s.view().toasts(), vec![alert::SEND_FAILURE]);
    assert!(s.report().is_some());

    // The report stays open, so a retry is possible.
    s.backend().fail_send.set(false);
    assert!(s.send_alert());
    assert_eq!(s.backend().sent.borrow().len(), 2);
}

// ---------------------------------------------------------------------------
// Activity log
// ---------------------------------------------------------------------------

#[test]
fn session_records_activity() {
    let path = std::env::temp_dir()
        .join(format!("alertdesk-session-{}", std::process::id()))
        .join("activity.jsonl");
    let _ = std::fs::remove_file(&path);
    let log = ActivityLog::at(&path);

    let mut s = session().with_activity(log.clone());
    s.dispatch(UiEvent::OpenLog("LOG-98765a".to_string()));
    s.select_chain(CHAIN);
    s.open_log("LOG-98765a");
    s.open_log("LOG-98765a");
    s.open_log("LOG-00000x");
    s.show_alert();
    s.copy_alert();

    let events: Vec<String> = log.read_all().into_iter().map(|e| e.event).collect();
    assert_eq!(
        events,
        vec![
            "unbound_event",
            "summary_fetched",
            "summary_cache_hit",
            "missing_element",
            "recommendations_fetched",
            "alert_copied",
        ]
    );

    let _ = std::fs::remove_file(path);
}
