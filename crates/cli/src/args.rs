//! Command-line arguments.

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Survey flight fares across a destination/date matrix and rank the
/// cheapest round trips.
#[derive(Debug, Parser)]
#[command(name = "farehound", version, about)]
pub struct Args {
    /// Start of the departure date range (YYYY-MM-DD).
    #[arg(long)]
    pub start_date: NaiveDate,

    /// End of the departure date range, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub end_date: NaiveDate,

    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Resume into an existing run directory instead of creating a new one.
    #[arg(long)]
    pub resume_dir: Option<PathBuf>,

    /// Resubmit tasks that previously exhausted their retries.
    #[arg(long)]
    pub retry_failed: bool,

    /// Skip searching; rebuild round trips and reports from stored legs.
    #[arg(long)]
    pub combine_only: bool,
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        if self.start_date > self.end_date {
            return Err("--start-date must not be after --end-date".to_string());
        }
        if self.combine_only && self.resume_dir.is_none() {
            return Err("--combine-only requires --resume-dir".to_string());
        }
        Ok(())
    }
}
