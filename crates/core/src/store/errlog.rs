//! Append-only error log for permanently-failed tasks.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::StoreError;

/// Line-oriented log: one `task_identity,error_text` line per failure.
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, task_identity: &str, error_text: &str) -> Result<(), StoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;

        // Keep the log line-oriented even when the error text has newlines.
        let flattened = error_text.replace('\n', " ");
        writeln!(file, "{},{}", task_identity, flattened)
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.flush().map_err(|e| StoreError::io(&self.path, e))
    }
}
