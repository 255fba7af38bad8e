/// Configuration system for alertdesk.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: [`schema::DeskConfig::default()`]
/// 2. **User global config**: `~/.alertdesk/config.toml`
/// 3. **Project local config**: `.alertdesk.toml` in the current directory
/// 4. **Environment variables**: `ALERTDESK_*` overrides (highest precedence)
///
/// # Usage
///
/// ```rust,ignore
/// use alertdesk::config;
///
/// let cfg = config::load();
/// let backend = HttpBackend::from_config(&cfg.backend);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::DeskConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> DeskConfig {
    let layers = [global_config_path(), project_config_path()]
        .into_iter()
        .filter_map(load_toml_file);
    let mut config = merge_layers(layers);

    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content does not fit the schema. A broken config file never stops the
/// dashboard from opening.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    let value: toml::Value = toml::from_str(&content).ok()?;
    value.clone().try_into::<DeskConfig>().ok()?;
    Some(value)
}

/// Fold file layers key by key; a later layer only replaces the keys it sets.
fn merge_layers(layers: impl IntoIterator<Item = toml::Value>) -> DeskConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());
    for layer in layers {
        merge_toml(&mut merged, layer);
    }
    merged.try_into().unwrap_or_default()
}

fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.alertdesk/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".alertdesk").join("config.toml"))
}

/// Path to the project local config: `.alertdesk.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".alertdesk.toml"))
}

pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `ALERTDESK_BACKEND_URL`: backend base URL
/// - `ALERTDESK_TIMEOUT_MS`: request timeout, `0` disables
/// - `ALERTDESK_DATA_FILE`: dataset JSON file
/// - `ALERTDESK_CLIPBOARD`: clipboard command line
/// - `ALERTDESK_LOGGING`: activity log on/off (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut DeskConfig) {
    if let Ok(val) = std::env::var("ALERTDESK_BACKEND_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Ok(val) = std::env::var("ALERTDESK_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("ALERTDESK_DATA_FILE") {
        config.dashboard.data_file = val;
    }
    if let Ok(val) = std::env::var("ALERTDESK_CLIPBOARD") {
        config.clipboard.command = val;
    }
    if let Ok(val) = std::env::var("ALERTDESK_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.alertdesk/config.toml`.
///
/// Returns an error if the file already exists and `force` is false.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.alertdesk/ directory")?;
    }

    fs::write(&path, DeskConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key in the global config file.
///
/// Supports dotted keys like `backend.base_url`. The existing value's type
/// decides how `value` is parsed.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&DeskConfig::default())
            .context("failed to serialize default config")?
    };

    let mut value_table: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut value_table, key, value)?;

    // Reject values the schema cannot load, e.g. `priorities.unrecognized = "maybe"`.
    let updated = toml::to_string_pretty(&value_table).context("failed to serialize config")?;
    toml::from_str::<DeskConfig>(&updated)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, updated).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((&leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Array(_)) => {
            // Comma-separated list, e.g. `priorities.high = high,critical`
            let items: Vec<toml::Value> = raw_value
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| toml::Value::String(s.to_string()))
                .collect();
            toml::Value::Array(items)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
