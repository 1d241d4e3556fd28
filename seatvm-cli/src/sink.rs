//! Completion sink for the command line: logs each completion event and,
//! when a progress file is configured, merges it into the ledger.

use std::path::PathBuf;

use seatvm_vm::{CompletionEvent, CompletionSink, SinkError};
use tracing::info;

use crate::ledger::{now_millis, Ledger};

#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    ledger: Option<PathBuf>,
}

impl ProgressSink {
    pub fn new(ledger: Option<PathBuf>) -> Self {
        Self { ledger }
    }
}

impl CompletionSink for ProgressSink {
    fn record(&self, event: &CompletionEvent) -> Result<(), SinkError> {
        let json = serde_json::to_string(event)?;
        info!(event = %json, "challenge completed");

        // Anonymous challenges have nothing to key progress on.
        if event.challenge_id.is_empty() {
            return Ok(());
        }
        if let Some(path) = &self.ledger {
            let mut ledger = Ledger::load(path)?;
            ledger.record(&event.challenge_id, event.step_count, now_millis());
            ledger.save(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatvm_vm::ExecutionMode;
    use tempfile::TempDir;

    fn event(id: &str, step_count: u64) -> CompletionEvent {
        CompletionEvent {
            challenge_id: id.into(),
            step_count,
            instruction_count: 3,
            execution_mode: ExecutionMode::Run,
        }
    }

    #[test]
    fn writes_ledger() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.json");
        let sink = ProgressSink::new(Some(path.clone()));
        sink.record(&event("challenge-4", 9)).unwrap();
        sink.record(&event("challenge-4", 6)).unwrap();

        let ledger = Ledger::load(&path).unwrap();
        assert_eq!(ledger.get("challenge-4").unwrap().best_step_count, Some(6));
    }

    #[test]
    fn skips_anonymous_challenges() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.json");
        ProgressSink::new(Some(path.clone()))
            .record(&event("", 1))
            .unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn ledger_errors_surface() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.json");
        std::fs::write(&path, "[").unwrap();
        let result = ProgressSink::new(Some(path)).record(&event("challenge-1", 1));
        assert!(result.is_err());
    }
}
