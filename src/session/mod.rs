//! Review session: the controller behind `alertdesk review` and the
//! one-shot commands.
//!
//! A [`ReviewSession`] owns the dataset, the summary cache, the event
//! bindings and the currently mounted panels. It talks to the outside world
//! only through the [`Backend`], [`Clipboard`] and [`View`] it was built
//! with.
//!
//! Missing targets (unknown chain or log, no chain selected, no report open)
//! are recorded as `missing_element` in the activity log and the operation
//! is skipped. Backend and clipboard failures surface in the view and never
//! leave the session.

pub mod alert;
pub mod detail;
pub mod events;

use crate::activity::ActivityLog;
use crate::backend::Backend;
use crate::cache::SummaryCache;
use crate::config::DeskConfig;
use crate::config::schema::PrioritiesConfig;
use crate::dashboard::{Dashboard, FailureChain};
use crate::utils::clipboard::Clipboard;
use crate::view::View;

use alert::{AlertReport, RecommendationsState, SendControl, SendGuard};
use detail::DetailPanel;
use events::{Bindings, Scope, UiEvent};

pub const HELP_TEXT: &str = "\
Commands:
  chains              list failure chains
  select <chain-id>   show a chain's details
  open <log-id>       open a log and its summary
  alert               open the alert report for the selected chain
  copy                copy the open report to the clipboard
  send                email the open report
  close               close the report
  clear-cache         forget fetched summaries
  help                show this help
  quit                leave the session";

/// Outcome of dispatching one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    /// No mounted view handles the event.
    Ignored,
    Quit,
}

pub struct ReviewSession<B, C, V> {
    dashboard: Dashboard,
    backend: B,
    clipboard: C,
    view: V,
    cache: SummaryCache,
    activity: ActivityLog,
    priorities: PrioritiesConfig,
    report_title: String,
    bindings: Bindings,
    selected_chain: Option<String>,
    detail: Option<DetailPanel>,
    report: Option<AlertReport>,
    send_control: SendControl,
}

impl<B: Backend, C: Clipboard, V: View> ReviewSession<B, C, V> {
    /// Build a session with default settings and no activity logging. The
    /// page scope is mounted immediately.
    pub fn new(dashboard: Dashboard, backend: B, clipboard: C, view: V) -> Self {
        let mut bindings = Bindings::new();
        bindings.register(Scope::Page);

        Self {
            dashboard,
            backend,
            clipboard,
            view,
            cache: SummaryCache::new(),
            activity: ActivityLog::disabled(),
            priorities: PrioritiesConfig::default(),
            report_title: DeskConfig::default().alert.report_title,
            bindings,
            selected_chain: None,
            detail: None,
            report: None,
            send_control: SendControl::default(),
        }
    }

    /// Apply formatter and report settings from the config.
    pub fn with_config(mut self, config: &DeskConfig) -> Self {
        self.priorities = config.priorities.clone();
        self.report_title = config.alert.report_title.clone();
        self
    }

    pub fn with_activity(mut self, activity: ActivityLog) -> Self {
        self.activity = activity;
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn cache(&self) -> &SummaryCache {
        &self.cache
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn selected_chain(&self) -> Option<&str> {
        self.selected_chain.as_deref()
    }

    pub fn detail(&self) -> Option<&DetailPanel> {
        self.detail.as_ref()
    }

    pub fn report(&self) -> Option<&AlertReport> {
        self.report.as_ref()
    }

    pub fn send_control(&self) -> &SendControl {
        &self.send_control
    }

    // -----------------------------------------------------------------------
    // Event dispatch
    // -----------------------------------------------------------------------

    /// Route an event to its handler if a mounted scope binds it.
    pub fn dispatch(&mut self, event: UiEvent) -> Dispatch {
        let kind = event.kind();
        if !self.bindings.is_bound(kind) {
            self.activity
                .failed("unbound_event", &kind.to_string(), "no mounted view handles it");
            return Dispatch::Ignored;
        }

        match event {
            UiEvent::ListChains => self.show_chains(),
            UiEvent::SelectChain(id) => {
                self.select_chain(&id);
            }
            UiEvent::OpenLog(id) => {
                self.open_log(&id);
            }
            UiEvent::ShowAlert => {
                self.show_alert();
            }
            UiEvent::HideAlert => {
                self.hide_alert();
            }
            UiEvent::CopyAlert => {
                self.copy_alert();
            }
            UiEvent::SendAlert => {
                self.send_alert();
            }
            UiEvent::ClearCache => self.clear_cache(),
            UiEvent::Help => self.view.notice(HELP_TEXT),
            UiEvent::Quit => return Dispatch::Quit,
        }
        Dispatch::Handled
    }

    // -----------------------------------------------------------------------
    // Page
    // -----------------------------------------------------------------------

    pub fn show_chains(&mut self) {
        self.view
            .chain_table(&self.dashboard, self.selected_chain.as_deref());
    }

    /// Select a chain and mount its details, replacing any previous chain
    /// details and closing an open report. Returns false if the chain is
    /// unknown.
    pub fn select_chain(&mut self, chain_id: &str) -> bool {
        let Some(chain) = self.dashboard.find_chain(chain_id) else {
            self.missing("chain", chain_id);
            return false;
        };

        self.bindings.teardown(Scope::AlertReport);
        self.bindings.teardown(Scope::ChainDetails);
        self.report = None;
        self.detail = None;

        self.selected_chain = Some(chain.id.clone());
        self.view.chain_details(&self.dashboard, chain);
        self.bindings.register(Scope::ChainDetails);
        true
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.activity.ok("cache_cleared", "session");
        self.view.notice("Summary cache cleared");
    }

    // -----------------------------------------------------------------------
    // Chain details
    // -----------------------------------------------------------------------

    /// Open a log of the selected chain in the detail panel.
    pub fn open_log(&mut self, log_id: &str) -> bool {
        let Some(chain) = selected(&self.dashboard, self.selected_chain.as_deref()) else {
            self.missing("selected chain", log_id);
            return false;
        };
        let Some(log) = chain.find_log(log_id) else {
            self.missing("log", log_id);
            return false;
        };

        let panel = detail::open(
            log,
            &mut self.cache,
            &self.backend,
            &self.activity,
            &mut self.view,
        );
        self.detail = Some(panel);
        true
    }

    /// Open the alert report for the selected chain and fetch its
    /// recommendations.
    pub fn show_alert(&mut self) -> bool {
        let Some(chain) = selected(&self.dashboard, self.selected_chain.as_deref()) else {
            self.missing("selected chain", "alert");
            return false;
        };

        let mut report = AlertReport::build(&self.dashboard, chain, &self.cache);
        self.bindings.register(Scope::AlertReport);
        self.view.alert_report(&report);
        self.view.recommendations(&RecommendationsState::Loading);

        report.recommendations = alert::fetch_recommendations(
            &report,
            &self.backend,
            &self.activity,
            &self.priorities,
        );
        self.view.recommendations(&report.recommendations);

        self.report = Some(report);
        true
    }

    // -----------------------------------------------------------------------
    // Alert report
    // -----------------------------------------------------------------------

    pub fn hide_alert(&mut self) -> bool {
        if self.report.take().is_none() {
            self.missing("alert report", "close");
            return false;
        }
        self.bindings.teardown(Scope::AlertReport);
        self.view.alert_closed();
        true
    }

    /// Copy the open report as plain text. Returns whether the clipboard
    /// accepted it.
    pub fn copy_alert(&mut self) -> bool {
        let Some(report) = &self.report else {
            self.missing("alert report", "copy");
            return false;
        };

        let text = report.to_plain_text();
        match self.clipboard.write_text(&text) {
            Ok(()) => {
                self.activity.ok("alert_copied", &report.chain_id);
                self.view.toast(alert::COPY_SUCCESS);
                true
            }
            Err(e) => {
                self.activity
                    .failed("alert_copied", &report.chain_id, &format!("{e:#}"));
                self.view.toast(alert::COPY_FAILURE);
                false
            }
        }
    }

    /// Send the open report as a standalone HTML document. The report
    /// closes on success. Returns whether the backend accepted it.
    pub fn send_alert(&mut self) -> bool {
        let Some(report) = &self.report else {
            self.missing("alert report", "send");
            return false;
        };

        let chain_id = report.chain_id.clone();
        let html = report.to_html_document(&self.report_title);

        let result = {
            let guard = SendGuard::engage(&mut self.send_control);
            self.view.send_control(guard.control());
            self.backend.send_alert(&html)
        };
        self.view.send_control(&self.send_control);

        match result {
            Ok(()) => {
                self.activity.ok("alert_sent", &chain_id);
                self.view.toast(alert::SEND_SUCCESS);
                self.hide_alert();
                true
            }
            Err(e) => {
                self.activity
                    .failed("alert_failed", &chain_id, &format!("{e:#}"));
                self.view.toast(alert::SEND_FAILURE);
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn missing(&self, element: &str, subject: &str) {
        self.activity
            .failed("missing_element", subject, &format!("{element} not found"));
    }
}

fn selected<'a>(dashboard: &'a Dashboard, chain_id: Option<&str>) -> Option<&'a FailureChain> {
    chain_id.and_then(|id| dashboard.find_chain(id))
}
