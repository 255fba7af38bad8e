/// Configuration schema and defaults for alertdesk.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[backend]`, `[priorities]`, `[dashboard]`, `[alert]`, `[clipboard]` and
/// `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level alertdesk configuration.
///
/// Maps directly to the `~/.alertdesk/config.toml` and `.alertdesk.toml`
/// file schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub backend: BackendConfig,
    pub priorities: PrioritiesConfig,
    pub dashboard: DashboardConfig,
    pub alert: AlertConfig,
    pub clipboard: ClipboardConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// Summary / recommendation / alert backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL the `/api/*` endpoints are resolved against.
    pub base_url: String,
    /// Request timeout in milliseconds. `0` leaves the transport default
    /// (no timeout) in place.
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// [priorities]
// ---------------------------------------------------------------------------

/// What to do with a heading whose label matches no priority keyword.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnrecognizedLabels {
    /// Keep the section with priority `Unknown`.
    #[default]
    Bucket,
    /// Skip the section and its items.
    Drop,
}

impl std::fmt::Display for UnrecognizedLabels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bucket => write!(f, "bucket"),
            Self::Drop => write!(f, "drop"),
        }
    }
}

/// Priority keyword sets used by the recommendation formatter.
///
/// Labels are matched case-insensitively by substring, checked in the order
/// high, medium, low.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrioritiesConfig {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
    pub unrecognized: UnrecognizedLabels,
}

impl Default for PrioritiesConfig {
    fn default() -> Self {
        Self {
            high: vec!["high".to_string()],
            medium: vec!["medium".to_string()],
            low: vec!["low".to_string()],
            unrecognized: UnrecognizedLabels::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// [dashboard]
// ---------------------------------------------------------------------------

/// Failure-chain dataset settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Path to a dataset JSON file. Empty selects the built-in sample.
    pub data_file: String,
}

// ---------------------------------------------------------------------------
// [alert]
// ---------------------------------------------------------------------------

/// Alert report settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// `<title>` of the standalone HTML document sent to the backend.
    pub report_title: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            report_title: "Ad Render Failure Report".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [clipboard]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Command line that receives the text on stdin. Empty = auto-detect.
    pub command: String,
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append activity entries to `~/.alertdesk/activity.jsonl`.
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ---------------------------------------------------------------------------
// Default TOML template
// ---------------------------------------------------------------------------

impl DeskConfig {
    /// The annotated config file written by `alertdesk config init`.
    pub fn default_toml() -> String {
        r#"# alertdesk configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (ALERTDESK_*)
#   2. Project config (.alertdesk.toml in current directory)
#   3. User global config (~/.alertdesk/config.toml)
#   4. Built-in defaults

[backend]
base_url = "http://127.0.0.1:5000"
timeout_ms = 0                  # 0 = no timeout

[priorities]
high = ["high"]
medium = ["medium"]
low = ["low"]
unrecognized = "bucket"         # bucket | drop

[dashboard]
data_file = ""                  # empty = built-in sample dataset

[alert]
report_title = "Ad Render Failure Report"

[clipboard]
command = ""                    # empty = pbcopy / wl-copy / xclip / xsel / clip

[logging]
enabled = true                  # ~/.alertdesk/activity.jsonl
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
