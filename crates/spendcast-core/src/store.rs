//! File-backed pattern table snapshots and prediction history
//!
//! Saves are atomic: the data is written to a temp file in the target
//! directory and renamed over the old file, so a crash mid-save leaves the
//! previous version intact. The prediction history lives beside the
//! snapshot (`patterns.json` -> `patterns.history.json`).

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::history::PredictionHistory;
use crate::predictor::PatternTable;

/// Snapshot file for a [`PatternTable`]
#[derive(Debug, Clone)]
pub struct PatternStore {
    path: PathBuf,
}

impl PatternStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default snapshot location (~/.local/share/spendcast/patterns.json)
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|d| d.join("spendcast").join("patterns.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Prediction history file next to the snapshot
    pub fn history_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("patterns");
        self.path.with_file_name(format!("{}.history.json", stem))
    }

    /// Load the snapshot, or `None` if nothing has been saved yet
    pub fn load(&self) -> Result<Option<PatternTable>> {
        let Some(content) = read_optional(&self.path)? else {
            debug!(path = %self.path.display(), "No pattern snapshot found");
            return Ok(None);
        };

        let table = PatternTable::from_json(&content).map_err(|e| {
            Error::InvalidData(format!(
                "Corrupt pattern snapshot {}: {}",
                self.path.display(),
                e
            ))
        })?;
        debug!(path = %self.path.display(), "Loaded pattern snapshot");
        Ok(Some(table))
    }

    /// Atomically replace the snapshot with `table`
    pub fn save(&self, table: &PatternTable) -> Result<()> {
        write_atomic(&self.path, &table.to_json()?)?;
        info!(path = %self.path.display(), "Saved pattern snapshot");
        Ok(())
    }

    /// Load the prediction history, empty if none has been saved
    pub fn load_history(&self) -> Result<PredictionHistory> {
        let path = self.history_path();
        let Some(content) = read_optional(&path)? else {
            return Ok(PredictionHistory::new());
        };

        serde_json::from_str(&content).map_err(|e| {
            Error::InvalidData(format!(
                "Corrupt prediction history {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Atomically replace the prediction history
    pub fn save_history(&self, history: &PredictionHistory) -> Result<()> {
        let path = self.history_path();
        write_atomic(&path, &serde_json::to_string_pretty(history)?)?;
        debug!(path = %path.display(), entries = history.len(), "Saved prediction history");
        Ok(())
    }
}

/// File contents, or `None` when the file does not exist
fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(|e| {
            Error::Store(format!(
                "Failed to create directory {}: {}",
                dir.display(),
                e
            ))
        })?;
    }

    let mut temp = NamedTempFile::new_in(&dir)
        .map_err(|e| Error::Store(format!("Failed to create temp file: {}", e)))?;
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| {
        Error::Store(format!("Failed to write {}: {}", path.display(), e.error))
    })?;
    Ok(())
}
