//! Run directory management.
//!
//! Each invocation writes into its own `runs/<date>/run_N/` directory so
//! repeated surveys never clobber each other; resuming points back at an
//! existing directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Create the next `runs/<today>/run_N` directory under `base`.
pub fn create_run_dir(base: &Path, today: chrono::NaiveDate) -> Result<PathBuf> {
    let day_dir = base.join(today.to_string());
    std::fs::create_dir_all(&day_dir)
        .with_context(|| format!("Failed to create {}", day_dir.display()))?;

    let next = next_run_number(&day_dir)?;
    let run_dir = day_dir.join(format!("run_{}", next));
    std::fs::create_dir(&run_dir)
        .with_context(|| format!("Failed to create {}", run_dir.display()))?;
    Ok(run_dir)
}

fn next_run_number(day_dir: &Path) -> Result<u32> {
    let mut max_seen = 0;
    for entry in std::fs::read_dir(day_dir)
        .with_context(|| format!("Failed to read {}", day_dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(num) = name.to_string_lossy().strip_prefix("run_").and_then(|n| n.parse().ok())
        else {
            continue;
        };
        max_seen = max_seen.max(num);
    }
    Ok(max_seen + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn run_numbers_increment() {
        let base = TempDir::new().unwrap();
        let today = "2026-04-20".parse().unwrap();

        let first = create_run_dir(base.path(), today).unwrap();
        let second = create_run_dir(base.path(), today).unwrap();

        assert!(first.ends_with("2026-04-20/run_1"));
        assert!(second.ends_with("2026-04-20/run_2"));
        assert!(first.is_dir() && second.is_dir());
    }

    #[test]
    fn unrelated_entries_are_ignored() {
        let base = TempDir::new().unwrap();
        let today: chrono::NaiveDate = "2026-04-20".parse().unwrap();
        let day_dir = base.path().join(today.to_string());
        std::fs::create_dir_all(day_dir.join("not_a_run")).unwrap();
        std::fs::write(day_dir.join("run_9"), "a file, not a dir").unwrap();

        let run = create_run_dir(base.path(), today).unwrap();
        assert!(run.ends_with("run_1"));
    }
}
