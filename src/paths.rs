//! Location of the Claude Desktop configuration file and its backups.
//!
//! Claude Desktop keeps `claude_desktop_config.json` in a per-user, per-OS
//! configuration directory:
//!
//! - macOS: `~/Library/Application Support/Claude/`
//! - Windows: `%APPDATA%\Claude\`
//! - Linux and others: `$XDG_CONFIG_HOME/Claude/` (usually `~/.config/Claude/`)

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

pub const CONFIG_FILE_NAME: &str = "claude_desktop_config.json";
pub const CLAUDE_DIR_NAME: &str = "Claude";
const BACKUP_MARKER: &str = ".backup.";

/// Returns the platform default location, if a config directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CLAUDE_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Resolves the file to edit. A non-empty override wins over the platform default.
pub fn resolve_config_path(override_path: Option<&str>) -> anyhow::Result<PathBuf> {
    if let Some(raw) = override_path.map(str::trim).filter(|p| !p.is_empty()) {
        return Ok(expand_home(raw));
    }
    default_config_path()
        .ok_or_else(|| anyhow::anyhow!("could not determine the user config directory; set claude.config_path"))
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(raw)
}

pub fn platform_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "macos",
        "windows" => "windows",
        "linux" => "linux",
        other => other,
    }
}

/// Filesystem-safe UTC timestamp, e.g. `2024-05-01T12-30-05-123Z`.
///
/// Lexical order equals chronological order.
pub fn backup_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

/// Timestamp with a zero-padded collision counter, so names still sort in creation order.
pub fn backup_suffix(timestamp: &str, n: u32) -> String {
    format!("{}-{:04}", timestamp, n)
}

/// `<file>.backup.<timestamp>` next to the config file.
pub fn backup_path_for(path: &Path, timestamp: &str) -> PathBuf {
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!("{}{}{}", file_name, BACKUP_MARKER, timestamp))
}

/// Prefix shared by all backups of `path` (`<file>.backup.`).
pub fn backup_prefix(path: &Path) -> Option<String> {
    path.file_name().map(|n| format!("{}{}", n.to_string_lossy(), BACKUP_MARKER))
}
