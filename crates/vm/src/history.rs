//! Snapshot history and rewind.
//!
//! Every step appends a full snapshot of the state it started from, so
//! rewinding is a pop rather than a reconstruction. Without a limit the
//! history grows by one snapshot per step; a limit drops the oldest
//! snapshots first.

use std::collections::VecDeque;

use crate::state::{ExecutionState, Snapshot};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<Snapshot>,
    limit: Option<usize>,
}

impl History {
    /// Unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// History keeping at most `limit` snapshots.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(1024)),
            limit: Some(limit),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        if self.limit == Some(0) {
            return;
        }
        self.entries.push_back(snapshot);
        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.entries.pop_front();
            }
        }
    }

    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }
}

/// Step back once.
///
/// Returns `None` when there is nothing to rewind. Otherwise the last
/// snapshot is restored with the remaining history; there is no redo.
pub fn rewind(state: &ExecutionState) -> Option<ExecutionState> {
    let mut previous = state.clone();
    let snapshot = previous.history.pop()?;
    previous.restore(snapshot);
    Some(previous)
}
