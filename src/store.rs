//! Read-modify-write persistence of the Claude Desktop configuration file.
//!
//! All operations are blocking; HTTP handlers call them through
//! `tokio::task::spawn_blocking`.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    paths,
    types::{BackupEntry, ConfigInfo, McpConfig, SaveOutcome, ValidationIssue},
    validation::{self, SERVERS_KEY},
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("configuration is invalid ({} issue(s))", .0.len())]
    Invalid(Vec<ValidationIssue>),
    /// The file on disk parsed but does not have the expected shape.
    #[error("{path} is malformed: {}", join_issues(.issues))]
    Malformed { path: PathBuf, issues: Vec<ValidationIssue> },
}

pub type StoreResult<T> = Result<T, StoreError>;

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io { path: path.to_path_buf(), source }
}

/// Handle on one configuration file. Cheap to clone, holds no open files.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// The whole document. A missing file reads as `{ "mcpServers": {} }`.
    pub fn load_full(&self) -> StoreResult<Value> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|source| StoreError::Parse { path: self.path.clone(), source }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(empty_document()),
            Err(e) => Err(io_err(&self.path)(e)),
        }
    }

    /// The `mcpServers` section, validated and typed.
    ///
    /// A document without `mcpServers` yields an empty section. Shape problems
    /// in the file are reported as `Malformed`, never as `Invalid`.
    pub fn load(&self) -> StoreResult<McpConfig> {
        let mut doc = self.load_full()?;
        if let Value::Object(map) = &mut doc {
            map.entry(SERVERS_KEY).or_insert_with(|| json!({}));
        }
        let issues = validation::validate_config(&doc);
        if !issues.is_empty() {
            return Err(StoreError::Malformed { path: self.path.clone(), issues });
        }
        serde_json::from_value(doc).map_err(|source| StoreError::Parse { path: self.path.clone(), source })
    }

    /// Validates `incoming`, backs up the current file and writes the merged document.
    ///
    /// Top-level keys of `incoming` replace those on disk; keys it does not
    /// mention are kept. Nothing is touched when validation fails.
    pub fn save(&self, incoming: &Value) -> StoreResult<SaveOutcome> {
        let issues = validation::validate_config(incoming);
        if !issues.is_empty() {
            return Err(StoreError::Invalid(issues));
        }

        let mut document = match self.load_full() {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(StoreError::Parse { .. }) => {
                tracing::warn!(
                    "Existing config at {} is not a JSON object; it will be replaced (a backup is kept)",
                    self.path.display()
                );
                serde_json::Map::new()
            }
            Err(e) => return Err(e),
        };
        if let Value::Object(incoming) = incoming {
            for (key, value) in incoming {
                document.insert(key.clone(), value.clone());
            }
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }

        let backup_path = if self.exists() { Some(self.create_backup()?) } else { None };

        let mut content = serde_json::to_string_pretty(&Value::Object(document))
            .map_err(|source| StoreError::Parse { path: self.path.clone(), source })?;
        content.push('\n');
        self.write_replace(content.as_bytes())?;

        tracing::info!(
            "Saved MCP config to {} (backup: {})",
            self.path.display(),
            backup_path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "none".to_string())
        );

        Ok(SaveOutcome {
            path: self.path.display().to_string(),
            backup_path: backup_path.map(|p| p.display().to_string()),
        })
    }

    fn create_backup(&self) -> StoreResult<PathBuf> {
        self.create_backup_at(Utc::now())
    }

    fn create_backup_at(&self, now: DateTime<Utc>) -> StoreResult<PathBuf> {
        let ts = paths::backup_timestamp(now);
        let mut backup = paths::backup_path_for(&self.path, &ts);
        // Two saves within the same millisecond must not overwrite each other's backup
        let mut n = 1;
        while backup.exists() {
            backup = paths::backup_path_for(&self.path, &paths::backup_suffix(&ts, n));
            n += 1;
        }
        fs::copy(&self.path, &backup).map_err(io_err(&backup))?;
        Ok(backup)
    }

    // Temp file + rename so readers never observe a half-written file
    fn write_replace(&self, bytes: &[u8]) -> StoreResult<()> {
        let file_name = self.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let tmp = self.path.with_file_name(format!(".{}.tmp", file_name));
        fs::write(&tmp, bytes).map_err(io_err(&tmp))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(&self.path)(e));
        }
        Ok(())
    }

    pub fn info(&self) -> StoreResult<ConfigInfo> {
        let backup_count = self.list_backups()?.len();
        let mut info = ConfigInfo {
            path: self.path.display().to_string(),
            exists: false,
            size_bytes: None,
            modified: None,
            server_count: 0,
            enabled_count: 0,
            disabled_count: 0,
            backup_count,
            platform: paths::platform_name().to_string(),
            parse_error: None,
        };

        let meta = match fs::metadata(&self.path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(info),
            Err(e) => return Err(io_err(&self.path)(e)),
        };
        info.exists = true;
        info.size_bytes = Some(meta.len());
        info.modified = meta.modified().ok().map(to_rfc3339);

        match self.load() {
            Ok(cfg) => {
                info.server_count = cfg.mcp_servers.len();
                info.enabled_count = cfg.enabled_count();
                info.disabled_count = info.server_count - info.enabled_count;
            }
            Err(StoreError::Malformed { issues, .. }) => info.parse_error = Some(join_issues(&issues)),
            Err(e @ StoreError::Parse { .. }) => info.parse_error = Some(e.to_string()),
            Err(e) => return Err(e),
        }
        Ok(info)
    }

    /// Backups of this file, newest first.
    pub fn list_backups(&self) -> StoreResult<Vec<BackupEntry>> {
        let (Some(dir), Some(prefix)) = (self.path.parent(), paths::backup_prefix(&self.path)) else {
            return Ok(Vec::new());
        };
        let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };

        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err(dir)(e)),
        };

        let mut items = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !file_name.starts_with(&prefix) {
                continue;
            }
            let Ok(meta) = entry.metadata() else { continue };
            if !meta.is_file() {
                continue;
            }
            items.push(BackupEntry {
                path: entry.path().display().to_string(),
                size_bytes: meta.len(),
                modified: meta.modified().ok().map(to_rfc3339),
                file_name,
            });
        }
        // Timestamp and zero-padded counter sort chronologically
        items.sort_by(|a, b| b.file_name.cmp(&a.file_name));
        Ok(items)
    }
}

fn empty_document() -> Value {
    json!({ SERVERS_KEY: {} })
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

fn to_rfc3339(t: SystemTime) -> String {
    DateTime::<Utc>::from(t).to_rfc3339()
}
