//! Analysis history, stored as JSON lines.
//!
//! Each analysis can be appended as one record. The store lives in the
//! platform data directory (`~/.local/share/codecritic/history.jsonl` on
//! Linux) unless a path is configured. Storage is a convenience: callers log
//! failures and carry on.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analyzer::AnalysisResult;

/// Submitter recorded when none is given.
pub const ANONYMOUS: &str = "anonymous";

const FILE_NAME: &str = "history.jsonl";

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// One stored analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    pub user_id: String,
    pub language: String,
    pub code: String,
    pub result: AnalysisResult,
    /// Unix timestamp in seconds.
    pub created_at: u64,
}

impl HistoryRecord {
    pub fn new(user_id: Option<&str>, language: &str, code: &str, result: AnalysisResult) -> Self {
        let created_at = current_timestamp();
        Self {
            id: next_id(),
            user_id: user_id.unwrap_or(ANONYMOUS).to_string(),
            language: language.to_string(),
            code: code.to_string(),
            result,
            created_at,
        }
    }
}

/// Append-only JSONL history file.
#[derive(Debug)]
pub struct History {
    path: PathBuf,
    /// Serializes appends from concurrent analyses in this process.
    write_lock: Mutex<()>,
}

impl History {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// History in the platform data directory, if one can be determined.
    pub fn default_location() -> Option<PathBuf> {
        ProjectDirs::from("", "", "codecritic").map(|dirs| dirs.data_dir().join(FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    pub fn append(&self, record: &HistoryRecord) -> Result<()> {
        let line = serde_json::to_string(record).context("failed to serialize history record")?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("history lock poisoned"))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        writeln!(file, "{}", line)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Append, logging instead of failing.
    pub fn record(&self, record: &HistoryRecord) {
        if let Err(e) = self.append(record) {
            warn!(path = %self.path.display(), error = %e, "failed to store analysis history");
        }
    }

    /// Most recent records first, optionally for one submitter only.
    ///
    /// Unreadable lines are skipped. A missing file is an empty history.
    pub fn recent(&self, user_id: Option<&str>, limit: usize) -> Result<Vec<HistoryRecord>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to open {}", self.path.display()))
            }
        };

        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("failed to read {}", self.path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryRecord>(&line) {
                Ok(record) if user_id.map_or(true, |u| record.user_id == u) => {
                    records.push(record)
                }
                Ok(_) => {}
                Err(e) => warn!(line = idx + 1, error = %e, "skipping unreadable history record"),
            }
        }

        records.reverse();
        records.truncate(limit);
        Ok(records)
    }
}

/// Unix timestamp in seconds.
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

/// Time-ordered identifier, unique within the process.
fn next_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{:04x}", nanos, seq & 0xffff)
}
