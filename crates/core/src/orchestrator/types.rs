//! Types for the search orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StoreError;

/// Errors that stop the whole run (storage problems, not search failures).
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// What happened across one orchestrator run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Tasks submitted to the scheduler.
    pub submitted: usize,
    /// Tasks that produced at least one leg record.
    pub with_results: usize,
    /// Tasks that completed empty after all retries.
    pub empty: usize,
    /// Tasks that exhausted retries on errors.
    pub failed: usize,
    /// Tasks never started because shutdown was requested.
    pub skipped: usize,
    /// Total leg records appended to the store.
    pub legs_found: usize,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.with_results + self.empty + self.failed
    }
}
