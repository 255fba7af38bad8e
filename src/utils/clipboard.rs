//! System clipboard access through the platform's command-line tools.
//!
//! No clipboard crate is linked; the text is piped into `pbcopy` (macOS),
//! `clip` (Windows) or the first of `wl-copy`, `xclip`, `xsel` found on
//! Linux. `[clipboard] command` overrides detection.

use anyhow::{Context, Result};

use crate::config::schema::ClipboardConfig;

use super::process::{is_command_available, pipe_to_command};

/// Destination for copied report text.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Clipboard backed by an external command.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    /// Explicit command line, split on whitespace. `None` = auto-detect.
    command: Option<Vec<String>>,
}

impl SystemClipboard {
    pub fn from_config(config: &ClipboardConfig) -> Self {
        let parts: Vec<String> = config
            .command
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Self {
            command: (!parts.is_empty()).then_some(parts),
        }
    }

    /// Resolve the command line to run: the configured one, or the first
    /// platform tool found on `PATH`.
    fn resolve(&self) -> Option<(String, Vec<String>)> {
        if let Some(parts) = &self.command {
            let (program, args) = parts.split_first()?;
            return Some((program.clone(), args.to_vec()));
        }

        CANDIDATES
            .iter()
            .find(|(program, _)| is_command_available(program))
            .map(|(program, args)| {
                (
                    program.to_string(),
                    args.iter().map(|a| a.to_string()).collect(),
                )
            })
    }

    /// Program that `write_text` would run, if any.
    pub fn tool(&self) -> Option<String> {
        self.resolve().map(|(program, _)| program)
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let (program, args) = self
            .resolve()
            .context("no clipboard tool found (set [clipboard] command)")?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        pipe_to_command(&program, &args, text)
    }
}

#[cfg(target_os = "macos")]
const CANDIDATES: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const CANDIDATES: &[(&str, &[&str])] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const CANDIDATES: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_command_is_split_on_whitespace() {
        let clipboard = SystemClipboard::from_config(&ClipboardConfig {
            command: "xclip -selection clipboard".to_string(),
        });
        let (program, args) = clipboard.resolve().unwrap();
        assert_eq!(program, "xclip");
        assert_eq!(args, vec!["-selection", "clipboard"]);
    }

    #[test]
    fn empty_command_means_auto_detect() {
        let clipboard = SystemClipboard::from_config(&ClipboardConfig::default());
        assert!(clipboard.command.is_none());
    }

    #[test]
    fn missing_tool_is_an_error() {
        let mut clipboard = SystemClipboard::from_config(&ClipboardConfig {
            command: "alertdesk-no-such-clipboard".to_string(),
        });
        assert!(clipboard.write_text("report").is_err());
    }
}
