use std::path::PathBuf;

use alertdesk::cli::{self, AlertOptions, OutputFormat};
use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "alertdesk")]
#[command(about = "Review ad render failure chains and send alert reports")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List failure chains
    Chains {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show a failure chain and its logs
    Show {
        /// Failure chain id, e.g. FC-2342-123
        chain: String,
    },
    /// Open a log and fetch its summary
    Summary {
        /// Failure chain id
        chain: String,
        /// Log id within the chain
        log: String,
    },
    /// Build the alert report for a chain
    Alert {
        /// Failure chain id
        chain: String,
        /// Copy the report to the clipboard
        #[arg(long)]
        copy: bool,
        /// Email the report through the backend
        #[arg(long)]
        send: bool,
        /// Also write the report as a standalone HTML file
        #[arg(long, value_name = "PATH")]
        html: Option<PathBuf>,
    },
    /// Parse recommendation text from a file (or stdin) and print it
    Format {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
        /// Output: text (default), json, html
        #[arg(long, default_value = "text")]
        output: String,
    },
    /// Interactive review session
    Review,
    /// Show recent activity log entries
    Activity {
        /// Number of entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check config, backend, dataset and clipboard
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default config to ~/.alertdesk/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `backend.base_url`
    Set { key: String, value: String },
    /// Restore the default config file
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Chains { format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_chains(fmt)
        }
        Commands::Show { chain } => cli::run_show(&chain),
        Commands::Summary { chain, log } => cli::run_summary(&chain, &log),
        Commands::Alert {
            chain,
            copy,
            send,
            html,
        } => cli::run_alert(
            &chain,
            AlertOptions {
                copy,
                send,
                html: html.as_deref(),
            },
        ),
        Commands::Format { file, output } => cli::run_format(file.as_deref(), &output),
        Commands::Review => cli::run_review(),
        Commands::Activity { limit, format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_activity(limit, fmt)
        }
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
