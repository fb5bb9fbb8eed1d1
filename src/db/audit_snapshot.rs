//! Audit log snapshot file
//!
//! The whole audit trail is mirrored to a single pretty-printed JSON array.
//! Saves overwrite the file through a temporary sibling and a rename. Disk
//! failures are logged and swallowed; the in-memory trail stays authoritative.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::AuditConfig;
use crate::models::AuditLogRecord;

#[derive(Debug, Clone)]
pub struct AuditSnapshot {
    enabled: bool,
    path: PathBuf,
}

impl AuditSnapshot {
    pub fn new(enabled: bool, path: impl Into<PathBuf>) -> Self {
        Self {
            enabled,
            path: path.into(),
        }
    }

    pub fn from_config(config: &AuditConfig) -> Self {
        Self::new(config.persist, config.resolved_file())
    }

    /// A snapshot that never touches the disk
    pub fn disabled() -> Self {
        Self::new(false, PathBuf::new())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a prior snapshot
    ///
    /// Returns `None` when persistence is disabled, the file is missing, or it
    /// cannot be read or decoded. An empty file, or a document that is not an
    /// array, loads as an empty trail.
    pub fn load(&self) -> Option<Vec<AuditLogRecord>> {
        if !self.enabled || !self.path.exists() {
            return None;
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                error!(path = %self.path.display(), "Failed to read audit log snapshot: {}", e);
                return None;
            }
        };

        if contents.trim().is_empty() {
            return Some(Vec::new());
        }

        let document: Value = match serde_json::from_str(&contents) {
            Ok(document) => document,
            Err(e) => {
                error!(path = %self.path.display(), "Failed to parse audit log snapshot: {}", e);
                return None;
            }
        };

        if !document.is_array() {
            warn!(path = %self.path.display(), "Audit log snapshot is not a JSON array, starting empty");
            return Some(Vec::new());
        }

        match serde_json::from_value(document) {
            Ok(records) => Some(records),
            Err(e) => {
                error!(path = %self.path.display(), "Failed to decode audit log records: {}", e);
                None
            }
        }
    }

    /// Overwrite the snapshot with `records`
    pub fn save(&self, records: &[AuditLogRecord]) {
        if !self.enabled {
            return;
        }
        match write_json_atomic(&self.path, records) {
            Ok(()) => debug!(path = %self.path.display(), count = records.len(), "Audit log snapshot written"),
            Err(e) => error!(path = %self.path.display(), "Failed to persist audit log snapshot: {:#}", e),
        }
    }
}

fn write_json_atomic(path: &Path, records: &[AuditLogRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let temp_path = path.with_extension("json.tmp");
    let written = write_pretty(&temp_path, records).and_then(|()| {
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to move snapshot into {}", path.display()))
    });

    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

fn write_pretty(path: &Path, records: &[AuditLogRecord]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).context("Failed to serialize audit log")?;
    writer.flush().context("Failed to flush audit log snapshot")?;
    writer
        .get_ref()
        .sync_all()
        .context("Failed to sync audit log snapshot")?;
    Ok(())
}
