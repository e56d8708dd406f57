//! Durable run state: the append-only leg store, the resumable progress
//! set, and the error log.
//!
//! The leg store is the single source of truth for everything downstream;
//! round trips are always rebuilt from it, never persisted incrementally.

pub(crate) mod csv;
mod errlog;
mod legs;
mod progress;

pub use errlog::ErrorLog;
pub use legs::{CsvLegStore, LegStore};
pub use progress::{JsonProgressStore, ProgressSet, ProgressStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record in {path}: {detail}")]
    Malformed { path: String, detail: String },
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn malformed(path: &std::path::Path, detail: impl Into<String>) -> Self {
        StoreError::Malformed {
            path: path.display().to_string(),
            detail: detail.into(),
        }
    }
}
