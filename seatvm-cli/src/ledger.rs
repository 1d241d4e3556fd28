//! Progress ledger: which challenges have been solved, and in how few steps.
//!
//! Stored as a JSON object keyed by challenge id. Recording a completion
//! merges with what is already there: the best step count only ever goes
//! down, and the first completion time is kept.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("cannot read progress file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write progress file '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid progress file '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub challenge_id: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_step_count: Option<u64>,
    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: BTreeMap<String, ProgressEntry>,
}

impl Ledger {
    /// Read a ledger. A missing file is an empty ledger.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(LedgerError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| LedgerError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let text = serde_json::to_string_pretty(self).map_err(|source| LedgerError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| LedgerError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Merge one completion into the ledger.
    pub fn record(&mut self, challenge_id: &str, step_count: u64, completed_at: u64) {
        let entry = self
            .entries
            .entry(challenge_id.to_string())
            .or_insert_with(|| ProgressEntry {
                challenge_id: challenge_id.to_string(),
                completed: false,
                best_step_count: None,
                completed_at: None,
            });
        entry.completed = true;
        entry.best_step_count = Some(
            entry
                .best_step_count
                .map_or(step_count, |best| best.min(step_count)),
        );
        entry.completed_at.get_or_insert(completed_at);
    }

    pub fn get(&self, challenge_id: &str) -> Option<&ProgressEntry> {
        self.entries.get(challenge_id)
    }

    pub fn is_completed(&self, challenge_id: &str) -> bool {
        self.get(challenge_id).is_some_and(|e| e.completed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
