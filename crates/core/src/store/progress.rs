//! Resumable progress persistence.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::planner::TaskKey;

use super::StoreError;

/// The set of task keys a run no longer needs to search.
///
/// Completed covers every terminal key, including tasks that exhausted their
/// retries. Those are additionally tracked in the failed set so an operator
/// can retry just the failures instead of clearing all progress.
#[derive(Debug, Clone, Default)]
pub struct ProgressSet {
    completed: HashSet<TaskKey>,
    failed: HashSet<TaskKey>,
}

impl ProgressSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &TaskKey) -> bool {
        self.completed.contains(key)
    }

    pub fn mark_completed(&mut self, key: TaskKey) {
        self.completed.insert(key);
    }

    /// Record a task that exhausted its retries. The key still counts as
    /// completed so this invocation never picks it up again.
    pub fn mark_failed(&mut self, key: TaskKey) {
        self.failed.insert(key.clone());
        self.completed.insert(key);
    }

    pub fn completed(&self) -> &HashSet<TaskKey> {
        &self.completed
    }

    pub fn failed(&self) -> &HashSet<TaskKey> {
        &self.failed
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Drop previously-failed keys from the completed set so the planner
    /// resubmits them, and forget the old failures.
    pub fn retry_failed(&mut self) {
        for key in self.failed.drain() {
            self.completed.remove(&key);
        }
    }
}

/// Trait for durable progress storage.
pub trait ProgressStore: Send + Sync {
    fn load(&self) -> Result<ProgressSet, StoreError>;
    fn save(&self, progress: &ProgressSet) -> Result<(), StoreError>;
}

/// JSON-file progress store.
///
/// `progress.json` holds a flat JSON array of task-key tuples and is
/// overwritten wholesale on every flush. Failed keys go to `failed.json` in
/// the same shape.
pub struct JsonProgressStore {
    progress_path: PathBuf,
    failed_path: PathBuf,
}

impl JsonProgressStore {
    /// Store rooted in a run directory, using the conventional file names.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            progress_path: dir.join("progress.json"),
            failed_path: dir.join("failed.json"),
        }
    }

    fn load_keys(path: &Path) -> Result<HashSet<TaskKey>, StoreError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => return Err(StoreError::io(path, e)),
        };
        serde_json::from_str(&raw).map_err(|e| StoreError::malformed(path, e.to_string()))
    }

    fn save_keys(path: &Path, keys: &HashSet<TaskKey>) -> Result<(), StoreError> {
        let list: Vec<&TaskKey> = keys.iter().collect();
        let raw = serde_json::to_string(&list)
            .map_err(|e| StoreError::malformed(path, e.to_string()))?;
        fs::write(path, raw).map_err(|e| StoreError::io(path, e))
    }
}

impl ProgressStore for JsonProgressStore {
    fn load(&self) -> Result<ProgressSet, StoreError> {
        Ok(ProgressSet {
            completed: Self::load_keys(&self.progress_path)?,
            failed: Self::load_keys(&self.failed_path)?,
        })
    }

    fn save(&self, progress: &ProgressSet) -> Result<(), StoreError> {
        Self::save_keys(&self.progress_path, &progress.completed)?;
        Self::save_keys(&self.failed_path, &progress.failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Direction;
    use tempfile::TempDir;

    fn key(dest: &str, date: &str) -> TaskKey {
        TaskKey::Leg(Direction::Outbound, dest.to_string(), date.parse().unwrap())
    }

    #[test]
    fn save_and_reload_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = JsonProgressStore::in_dir(dir.path());

        let mut progress = ProgressSet::new();
        progress.mark_completed(key("CUN", "2026-05-01"));
        progress.mark_completed(key("PUJ", "2026-05-02"));
        progress.mark_failed(key("SJU", "2026-05-03"));
        store.save(&progress).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.completed_count(), 3);
        assert!(loaded.contains(&key("CUN", "2026-05-01")));
        assert!(loaded.contains(&key("SJU", "2026-05-03")));
        assert_eq!(loaded.failed().len(), 1);
    }

    #[test]
    fn missing_files_load_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonProgressStore::in_dir(dir.path());
        let progress = store.load().unwrap();
        assert_eq!(progress.completed_count(), 0);
        assert!(progress.failed().is_empty());
    }

    #[test]
    fn progress_file_is_a_flat_array_of_tuples() {
        let dir = TempDir::new().unwrap();
        let store = JsonProgressStore::in_dir(dir.path());

        let mut progress = ProgressSet::new();
        progress.mark_completed(key("CUN", "2026-05-01"));
        store.save(&progress).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("progress.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([["outbound", "CUN", "2026-05-01"]])
        );
    }

    #[test]
    fn retry_failed_reopens_only_failed_keys() {
        let mut progress = ProgressSet::new();
        progress.mark_completed(key("CUN", "2026-05-01"));
        progress.mark_failed(key("SJU", "2026-05-03"));

        progress.retry_failed();

        assert!(progress.contains(&key("CUN", "2026-05-01")));
        assert!(!progress.contains(&key("SJU", "2026-05-03")));
        assert!(progress.failed().is_empty());
    }
}
