//! UI events and the bindings that route them.
//!
//! Every interactive action is a [`UiEvent`]. An event is only handled while
//! a view scope that accepts it is mounted: the page scope exists for the
//! whole session, chain details are mounted when a chain is selected and
//! replaced when another one is, and the alert report is mounted while the
//! report is open. Tearing a scope down removes all of its bindings at once.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ListChains,
    SelectChain(String),
    OpenLog(String),
    ShowAlert,
    HideAlert,
    CopyAlert,
    SendAlert,
    ClearCache,
    Help,
    Quit,
}

/// Payload-free event discriminant used as the binding key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ListChains,
    SelectChain,
    OpenLog,
    ShowAlert,
    HideAlert,
    CopyAlert,
    SendAlert,
    ClearCache,
    Help,
    Quit,
}

impl UiEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ListChains => EventKind::ListChains,
            Self::SelectChain(_) => EventKind::SelectChain,
            Self::OpenLog(_) => EventKind::OpenLog,
            Self::ShowAlert => EventKind::ShowAlert,
            Self::HideAlert => EventKind::HideAlert,
            Self::CopyAlert => EventKind::CopyAlert,
            Self::SendAlert => EventKind::SendAlert,
            Self::ClearCache => EventKind::ClearCache,
            Self::Help => EventKind::Help,
            Self::Quit => EventKind::Quit,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ListChains => "chains",
            Self::SelectChain => "select",
            Self::OpenLog => "open",
            Self::ShowAlert => "alert",
            Self::HideAlert => "close",
            Self::CopyAlert => "copy",
            Self::SendAlert => "send",
            Self::ClearCache => "clear-cache",
            Self::Help => "help",
            Self::Quit => "quit",
        };
        write!(f, "{name}")
    }
}

/// Parse one line of `alertdesk review` input.
impl FromStr for UiEvent {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            bail!("empty command");
        };
        let arg = parts.next();

        let event = match (command.to_ascii_lowercase().as_str(), arg) {
            ("chains" | "ls", None) => Self::ListChains,
            ("select" | "chain", Some(id)) => Self::SelectChain(id.to_string()),
            ("open" | "log", Some(id)) => Self::OpenLog(id.to_string()),
            ("alert", None) => Self::ShowAlert,
            ("close", None) => Self::HideAlert,
            ("copy", None) => Self::CopyAlert,
            ("send", None) => Self::SendAlert,
            ("clear-cache", None) => Self::ClearCache,
            ("help" | "?", None) => Self::Help,
            ("quit" | "exit" | "q", None) => Self::Quit,
            ("select" | "chain" | "open" | "log", None) => {
                bail!("`{command}` needs an id")
            }
            (_, Some(_)) if is_known(command) => bail!("`{command}` takes no argument"),
            _ => bail!("unknown command `{command}` (try `help`)"),
        };

        if parts.next().is_some() {
            bail!("too many arguments for `{command}`");
        }
        Ok(event)
    }
}

fn is_known(command: &str) -> bool {
    matches!(
        command.to_ascii_lowercase().as_str(),
        "chains" | "ls" | "alert" | "close" | "copy" | "send" | "clear-cache" | "help" | "?"
            | "quit" | "exit" | "q"
    )
}

// ---------------------------------------------------------------------------
// Bindings
// ---------------------------------------------------------------------------

/// A mounted part of the interface that owns event bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Page,
    ChainDetails,
    AlertReport,
}

impl Scope {
    /// Events a scope handles while mounted.
    pub fn events(self) -> &'static [EventKind] {
        match self {
            Self::Page => &[
                EventKind::ListChains,
                EventKind::SelectChain,
                EventKind::ClearCache,
                EventKind::Help,
                EventKind::Quit,
            ],
            Self::ChainDetails => &[EventKind::OpenLog, EventKind::ShowAlert],
            Self::AlertReport => &[
                EventKind::HideAlert,
                EventKind::CopyAlert,
                EventKind::SendAlert,
            ],
        }
    }
}

/// Active event bindings, keyed by the scope that registered them.
#[derive(Debug, Default, Clone)]
pub struct Bindings {
    active: Vec<(Scope, EventKind)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a scope. Mounting an already-mounted scope replaces its
    /// bindings rather than duplicating them.
    pub fn register(&mut self, scope: Scope) {
        self.teardown(scope);
        self.active
            .extend(scope.events().iter().map(|&kind| (scope, kind)));
    }

    /// Unmount a scope and drop all of its bindings.
    pub fn teardown(&mut self, scope: Scope) {
        self.active.retain(|(s, _)| *s != scope);
    }

    pub fn is_mounted(&self, scope: Scope) -> bool {
        self.active.iter().any(|(s, _)| *s == scope)
    }

    pub fn is_bound(&self, kind: EventKind) -> bool {
        self.active.iter().any(|(_, k)| *k == kind)
    }

    /// Number of live bindings.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_review_commands() {
        assert_eq!("chains".parse::<UiEvent>().unwrap(), UiEvent::ListChains);
        assert_eq!(
            "select FC-2342-123".parse::<UiEvent>().unwrap(),
            UiEvent::SelectChain("FC-2342-123".to_string())
        );
        assert_eq!(
            "  open   LOG-98765a ".parse::<UiEvent>().unwrap(),
            UiEvent::OpenLog("LOG-98765a".to_string())
        );
        assert_eq!("CLOSE".parse::<UiEvent>().unwrap(), UiEvent::HideAlert);
        assert_eq!("q".parse::<UiEvent>().unwrap(), UiEvent::Quit);
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!("".parse::<UiEvent>().is_err());
        assert!("open".parse::<UiEvent>().is_err());
        assert!("copy now".parse::<UiEvent>().is_err());
        assert!("select a b".parse::<UiEvent>().is_err());
        assert!("frobnicate".parse::<UiEvent>().is_err());
    }

    #[test]
    fn teardown_removes_only_that_scope() {
        let mut bindings = Bindings::new();
        bindings.register(Scope::Page);
        bindings.register(Scope::ChainDetails);
        assert!(bindings.is_bound(EventKind::OpenLog));

        bindings.teardown(Scope::ChainDetails);
        assert!(!bindings.is_bound(EventKind::OpenLog));
        assert!(!bindings.is_mounted(Scope::ChainDetails));
        assert!(bindings.is_bound(EventKind::SelectChain));
    }

    #[test]
    fn remounting_does_not_duplicate_bindings() {
        let mut bindings = Bindings::new();
        bindings.register(Scope::AlertReport);
        let once = bindings.len();
        bindings.register(Scope::AlertReport);
        assert_eq!(bindings.len(), once);
        assert_eq!(once, Scope::AlertReport.events().len());
    }

    #[test]
    fn event_kind_names_match_commands() {
        for line in ["chains", "alert", "close", "copy", "send", "clear-cache", "help", "quit"] {
            let event: UiEvent = line.parse().unwrap();
            assert_eq!(event.kind().to_string(), line);
        }
    }
}
