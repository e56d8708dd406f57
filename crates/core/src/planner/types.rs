//! Types for the search planning system.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way a one-way leg flies relative to the home airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outbound,
    Return,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outbound => "outbound",
            Direction::Return => "return",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identity of a search task, used for progress deduplication.
///
/// Serializes as a plain JSON array so the progress file is a flat array of
/// tuples: `["outbound","CUN","2026-05-01"]` for a per-direction leg search,
/// `["CUN","2026-05-01",4]` for a combined per-trip search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskKey {
    /// One leg search: (direction, destination code, departure date).
    Leg(Direction, String, NaiveDate),
    /// One combined round-trip search: (destination code, depart date, trip days).
    Trip(String, NaiveDate, u32),
}

impl TaskKey {
    pub fn destination(&self) -> &str {
        match self {
            TaskKey::Leg(_, dest, _) => dest,
            TaskKey::Trip(dest, _, _) => dest,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            TaskKey::Leg(_, _, date) => *date,
            TaskKey::Trip(_, date, _) => *date,
        }
    }

    /// Comma-separated identity used in the error log.
    pub fn identity(&self) -> String {
        match self {
            TaskKey::Leg(direction, dest, date) => {
                format!("{},{},{}", direction, dest, date)
            }
            TaskKey::Trip(dest, date, days) => {
                format!("trip,{},{},{}", dest, date, days)
            }
        }
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKey::Leg(direction, dest, date) => {
                write!(f, "{} {} {}", direction, dest, date)
            }
            TaskKey::Trip(dest, date, days) => {
                write!(f, "{} {} ({}d)", dest, date, days)
            }
        }
    }
}

/// One unit of search work. Created by the planner, consumed exactly once by
/// the orchestrator, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTask {
    pub key: TaskKey,
    /// Airport the searched flight departs from.
    pub origin: String,
    /// Airport the searched flight arrives at.
    pub destination: String,
    /// Destination code the results are grouped under (always the away
    /// airport, regardless of leg direction).
    pub dest_code: String,
    pub city_name: String,
    /// Departure date of the (outbound) leg.
    pub date: NaiveDate,
    /// Set only for combined per-trip tasks.
    pub trip_length: Option<u32>,
}
