//! CLI command implementations for alertdesk.
//!
//! Provides subcommand handlers for:
//! - `alertdesk chains`: failure-chain table
//! - `alertdesk show <chain>`: chain details with log cards
//! - `alertdesk summary <chain> <log>`: open one log and fetch its summary
//! - `alertdesk alert <chain>`: alert report with recommendations
//! - `alertdesk format [file]`: run the recommendation formatter
//! - `alertdesk review`: interactive review session
//! - `alertdesk activity`: recent activity log entries
//! - `alertdesk health`: config, backend, dataset and clipboard checks
//! - `alertdesk config show|init|set|reset`: configuration management

use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::activity::{ActivityEntry, ActivityLog};
use crate::backend::HttpBackend;
use crate::config::{self, DeskConfig};
use crate::dashboard::{Dashboard, FailureChain, format_timestamp};
use crate::recommend::{self, render};
use crate::session::events::UiEvent;
use crate::session::{Dispatch, ReviewSession};
use crate::utils::clipboard::SystemClipboard;
use crate::view::{TerminalView, View};

type CliSession = ReviewSession<HttpBackend, SystemClipboard, TerminalView<io::Stdout>>;

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Build a session wired to the real backend, clipboard and stdout.
fn open_session(config: &DeskConfig) -> Result<CliSession> {
    let dashboard = Dashboard::load(&config.dashboard)?;
    Ok(ReviewSession::new(
        dashboard,
        HttpBackend::from_config(&config.backend),
        SystemClipboard::from_config(&config.clipboard),
        TerminalView::stdout(),
    )
    .with_config(config)
    .with_activity(ActivityLog::from_config(&config.logging)))
}

fn select_or_report(session: &mut CliSession, chain_id: &str) -> bool {
    if session.select_chain(chain_id) {
        return true;
    }
    println!("{}", format!("Chain {chain_id} not found.").yellow());
    false
}

// ---------------------------------------------------------------------------
// alertdesk chains
// ---------------------------------------------------------------------------

/// List the failure chains of the configured dataset.
pub fn run_chains(format: OutputFormat) -> Result<()> {
    let config = config::load();
    let dashboard = Dashboard::load(&config.dashboard)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&dashboard.chains)?);
        }
        OutputFormat::Csv => {
            println!("id,timestamp,failure_type,ad_unit,page_url,revenue_impact,logs");
            for chain in &dashboard.chains {
                println!("{}", chain_csv_row(chain));
            }
        }
        OutputFormat::Table => TerminalView::stdout().chain_table(&dashboard, None),
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// alertdesk show / summary
// ---------------------------------------------------------------------------

/// Show one chain's details.
pub fn run_show(chain_id: &str) -> Result<()> {
    let config = config::load();
    let mut session = open_session(&config)?;
    select_or_report(&mut session, chain_id);
    Ok(())
}

/// Open one log of a chain and fetch its summary.
pub fn run_summary(chain_id: &str, log_id: &str) -> Result<()> {
    let config = config::load();
    let mut session = open_session(&config)?;
    if select_or_report(&mut session, chain_id) && !session.open_log(log_id) {
        println!(
            "{}",
            format!("Log {log_id} not found in chain {chain_id}.").yellow()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// alertdesk alert
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct AlertOptions<'a> {
    pub copy: bool,
    pub send: bool,
    pub html: Option<&'a Path>,
}

/// Build the alert report for a chain, then copy / export / send it.
pub fn run_alert(chain_id: &str, options: AlertOptions<'_>) -> Result<()> {
    let config = config::load();
    let mut session = open_session(&config)?;
    if !select_or_report(&mut session, chain_id) || !session.show_alert() {
        return Ok(());
    }

    if let Some(path) = options.html
        && let Some(report) = session.report()
    {
        let document = report.to_html_document(&config.alert.report_title);
        fs::write(path, document)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!(
            "{} Report written to {}",
            "✓".green().bold(),
            path.display()
        );
    }

    if options.copy {
        session.copy_alert();
    }
    if options.send {
        session.send_alert();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// alertdesk format
// ---------------------------------------------------------------------------

/// Parse recommendation text from a file or stdin and print the result.
///
/// `target` is `text` (default), `json` or `html`.
pub fn run_format(file: Option<&Path>, target: &str) -> Result<()> {
    let raw = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let config = config::load();
    let document = recommend::parse(&raw, &config.priorities);

    match target {
        "json" => println!("{}", serde_json::to_string_pretty(&document)?),
        "html" => println!("{}", render::to_html(&document)),
        _ => print!("{}", render::to_terminal(&document)),
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// alertdesk review
// ---------------------------------------------------------------------------

/// Interactive review session over stdin.
pub fn run_review() -> Result<()> {
    let config = config::load();
    let mut session = open_session(&config)?;

    println!("{}", "alertdesk review".bold().cyan());
    println!("{}", "Type `help` for commands, `quit` to leave.".dimmed());
    session.show_chains();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", "alertdesk>".bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let event = match line.parse::<UiEvent>() {
            Ok(event) => event,
            Err(e) => {
                println!("{}", e.to_string().yellow());
                continue;
            }
        };

        let kind = event.kind();
        match session.dispatch(event) {
            Dispatch::Handled => {}
            Dispatch::Ignored => println!(
                "{}",
                format!("`{kind}` is not available here.").dimmed()
            ),
            Dispatch::Quit => break,
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// alertdesk activity
// ---------------------------------------------------------------------------

/// Show the most recent activity log entries.
pub fn run_activity(limit: usize, format: OutputFormat) -> Result<()> {
    let config = config::load();
    let log = ActivityLog::from_config(&config.logging);
    let entries = log.read_recent(limit);

    if entries.is_empty() {
        println!(
            "{}",
            "No activity yet. Open a log or an alert report to record some.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Csv => print_activity_csv(&entries),
        OutputFormat::Table => print_activity_table(&entries),
    }

    Ok(())
}

fn print_activity_table(entries: &[ActivityEntry]) {
    println!("{}", "alertdesk Activity".bold().cyan());
    println!("{}", "=".repeat(78));
    println!(
        "  {:<19} {:<24} {:<14} {:>8}  Detail",
        "Time", "Event", "Subject", "Latency"
    );
    println!("  {}", "-".repeat(76));

    for entry in entries {
        let latency = entry
            .latency_ms
            .map(|ms| format!("{ms}ms"))
            .unwrap_or_default();
        let line = format!(
            "  {:<19} {:<24} {:<14} {:>8}  {}",
            format_timestamp(&entry.timestamp),
            truncate(&entry.event, 24),
            truncate(&entry.subject, 14),
            latency,
            entry.detail.as_deref().unwrap_or(""),
        );
        if entry.success {
            println!("{line}");
        } else {
            println!("{}", line.red());
        }
    }
}

fn print_activity_csv(entries: &[ActivityEntry]) {
    println!("timestamp,event,subject,success,latency_ms,detail");
    for entry in entries {
        println!(
            "{},{},{},{},{},{}",
            entry.timestamp,
            entry.event,
            entry.subject,
            entry.success,
            entry.latency_ms.map(|ms| ms.to_string()).unwrap_or_default(),
            csv_field(entry.detail.as_deref().unwrap_or("")),
        );
    }
}

// ---------------------------------------------------------------------------
// alertdesk health
// ---------------------------------------------------------------------------

/// Check config, backend reachability, dataset, clipboard and activity log.
pub fn run_health() -> Result<()> {
    println!("{}", "alertdesk Health Check".bold().cyan());
    println!("{}", "=".repeat(50));

    let config = config::load();

    // 1. Config
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Config",
        true,
        if global_exists {
            "~/.alertdesk/config.toml"
        } else {
            "built-in defaults"
        },
    );

    // 2. Backend
    let backend = HttpBackend::from_config(&config.backend);
    let reachable = backend.is_reachable();
    let backend_detail = if reachable {
        format!("reachable at {}", backend.base_url())
    } else {
        format!("not reachable at {}", backend.base_url())
    };
    print_health_item("Backend", reachable, &backend_detail);

    // 3. Dataset
    match Dashboard::load(&config.dashboard) {
        Ok(dashboard) => print_health_item(
            "Dataset",
            true,
            &format!(
                "{} chains for {}",
                dashboard.chains.len(),
                dashboard.publisher_name
            ),
        ),
        Err(e) => print_health_item("Dataset", false, &format!("{e:#}")),
    }

    // 4. Clipboard
    let clipboard = SystemClipboard::from_config(&config.clipboard);
    match clipboard.tool() {
        Some(tool) => print_health_item("Clipboard", true, &tool),
        None => print_health_item("Clipboard", false, "no clipboard tool found"),
    }

    // 5. Activity log
    let log = ActivityLog::from_config(&config.logging);
    match log.path() {
        Some(path) if path.exists() => print_health_item(
            "Activity log",
            true,
            &format!("{} entries", log.read_all().len()),
        ),
        Some(_) => print_health_item("Activity log", true, "no log file yet"),
        None => print_health_item("Activity log", true, "disabled"),
    }

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// alertdesk config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective alertdesk Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.alertdesk/config.toml", global_exists);
    print_source(".alertdesk.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "ALERTDESK_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.alertdesk/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Edit the file to point at your backend.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

fn chain_csv_row(chain: &FailureChain) -> String {
    [
        csv_field(&chain.id),
        csv_field(&chain.timestamp),
        csv_field(&chain.failure_type),
        csv_field(&chain.ad_unit),
        csv_field(&chain.page_url),
        csv_field(&chain.revenue_impact),
        chain.logs.len().to_string(),
    ]
    .join(",")
}

/// Quote a CSV field if it contains a separator, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("summary_cache_hit", 8), "summary…");
        assert_eq!(truncate("ab", 2), "ab");
    }

    #[test]
    fn test_csv_field() {
        assert_eq!(csv_field("status 500"), "status 500");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_chain_csv_row_quotes_commas() {
        let chain = FailureChain {
            id: "FC-1".to_string(),
            timestamp: "2024-03-01T10:00:00Z".to_string(),
            failure_type: "Render Failure, Retry Exhausted".to_string(),
            ad_unit: "Sidebar-300x250".to_string(),
            page_url: "/search?q=a,b".to_string(),
            revenue_impact: "$2.45".to_string(),
            logs: Vec::new(),
        };
        assert_eq!(
            chain_csv_row(&chain),
            "FC-1,2024-03-01T10:00:00Z,\"Render Failure, Retry Exhausted\",Sidebar-300x250,\"/search?q=a,b\",$2.45,0"
        );
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }
}
