//! Snapshot persistence for wfpulse.
//!
//! The durable copy of the record set is one JSON file holding a flat array
//! of [`WorkflowRecord`]s. Every refresh replaces it wholesale; there is no
//! merge with history. Writes go through a temp file in the target
//! directory followed by an atomic rename, so a reader never observes a
//! half-written snapshot. Reads never fail: a missing or corrupt file is an
//! empty snapshot.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use wfpulse_core::WorkflowRecord;

/// Errors surfaced by snapshot writes. Reads degrade instead of erroring.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Summary of the current snapshot, computed at call time.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotStats {
    pub updated_at: DateTime<Utc>,
    pub by_platform: BTreeMap<String, usize>,
    pub by_country: BTreeMap<String, usize>,
    pub total: usize,
}

/// Owner of the durable snapshot file.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the persisted snapshot.
    ///
    /// A missing file, unreadable file, or a body that does not parse as a
    /// record array all yield an empty snapshot — the service keeps serving
    /// rather than failing on bad state left behind by an older version.
    #[must_use]
    pub fn load_all(&self) -> Vec<WorkflowRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "snapshot read failed");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<WorkflowRecord>>(&content) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "snapshot file is corrupt; treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Atomically replaces the snapshot with `records`.
    ///
    /// The parent directory is created if absent. The serialized body is
    /// written to a temp file in the same directory and renamed over the
    /// target, so concurrent readers see either the old or the new
    /// snapshot, never a torn one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or any filesystem step fails.
    pub fn save_all(&self, records: &[WorkflowRecord]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                parent
            }
            _ => Path::new("."),
        };

        let body = serde_json::to_vec_pretty(records)?;

        // Temp file must live in the target directory: rename is only
        // atomic within one filesystem.
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        tracing::info!(
            path = %self.path.display(),
            records = records.len(),
            "snapshot replaced"
        );
        Ok(())
    }

    /// Counts the current snapshot by platform and country.
    #[must_use]
    pub fn stats(&self) -> SnapshotStats {
        let records = self.load_all();

        let mut by_platform: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_country: BTreeMap<String, usize> = BTreeMap::new();
        for record in &records {
            *by_platform.entry(record.platform.name().to_owned()).or_default() += 1;
            *by_country.entry(record.country.code().to_owned()).or_default() += 1;
        }

        SnapshotStats {
            updated_at: Utc::now(),
            by_platform,
            by_country,
            total: records.len(),
        }
    }
}
