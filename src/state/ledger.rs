//! Ledger - persisted record of which items have been processed
//!
//! One JSON object keyed by item key. A key present in the ledger is never
//! processed again automatically, whatever its status; only [`Ledger::clear`]
//! or [`Ledger::clear_all`] make it eligible again. The whole map is rewritten
//! on every [`Ledger::save`]. There is no internal locking: callers must
//! guarantee a single writer.

use crate::models::{RunResult, RunStatus};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Terminal status stored per item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerStatus {
    Completed,
    Failed,
}

impl LedgerStatus {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerStatus::Completed => "completed",
            LedgerStatus::Failed => "failed",
        }
    }
}

/// Last processing outcome of one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    pub processed_at: DateTime<Utc>,
    pub status: LedgerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LedgerRecord {
    /// Summarize a run result; anything not completed is recorded as failed
    pub fn from_result(result: &RunResult, processed_at: DateTime<Utc>) -> Self {
        let status = match result.status {
            RunStatus::Completed => LedgerStatus::Completed,
            RunStatus::Failed | RunStatus::Started => LedgerStatus::Failed,
        };
        Self {
            processed_at,
            status,
            pr_url: result.pr_url.clone(),
            error: result.error(),
        }
    }
}

/// Counts of recorded outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Ledger bound to a file
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    records: BTreeMap<String, LedgerRecord>,
}

impl Ledger {
    /// Empty ledger bound to `path`, nothing read yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: BTreeMap::new(),
        }
    }

    /// Bind to `path` and load it
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut ledger = Self::new(path);
        ledger.load();
        ledger
    }

    /// Replace the in-memory map with the file's contents
    ///
    /// A missing or unreadable file yields an empty map.
    pub fn load(&mut self) {
        self.records = match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "ledger file is unreadable, starting empty"
                    );
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
    }

    /// Serialize the full map, replacing the file
    ///
    /// Writes a sibling temp file and renames it over the ledger, so a crash
    /// mid-write leaves the previous contents intact.
    pub fn save(&self) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let content =
            serde_json::to_string_pretty(&self.records).context("Failed to serialize ledger")?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .context("Failed to create temporary ledger file")?;
        tmp.write_all(content.as_bytes())
            .context("Failed to write ledger")?;
        tmp.as_file().sync_all().context("Failed to sync ledger")?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&LedgerRecord> {
        self.records.get(key)
    }

    /// Insert or overwrite; the caller persists with [`Ledger::save`]
    pub fn record(&mut self, key: impl Into<String>, record: LedgerRecord) {
        self.records.insert(key.into(), record);
    }

    /// Remove one entry, returning whether it existed
    pub fn clear(&mut self, key: &str) -> bool {
        self.records.remove(key).is_some()
    }

    pub fn clear_all(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ordered by key
    pub fn records(&self) -> impl Iterator<Item = (&String, &LedgerRecord)> {
        self.records.iter()
    }

    pub fn summary(&self) -> LedgerSummary {
        let completed = self
            .records
            .values()
            .filter(|r| r.status == LedgerStatus::Completed)
            .count();
        LedgerSummary {
            total: self.records.len(),
            completed,
            failed: self.records.len() - completed,
        }
    }
}
