//! Raw and normalized offer records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::planner::Direction;

/// Stops field as reported by a search backend: either already a count or
/// free text like "Nonstop" / "1 stop" / "Unknown".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopsValue {
    Count(i64),
    Text(String),
}

impl Default for StopsValue {
    fn default() -> Self {
        StopsValue::Text(String::new())
    }
}

impl From<&str> for StopsValue {
    fn from(text: &str) -> Self {
        StopsValue::Text(text.to_string())
    }
}

impl From<i64> for StopsValue {
    fn from(count: i64) -> Self {
        StopsValue::Count(count)
    }
}

/// One unstructured flight offer as returned by a search backend.
///
/// All fields are best-effort text; the normalizer decides what survives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOffer {
    /// Price text, e.g. "$507" or "$1,234".
    #[serde(default)]
    pub price: String,
    /// Travel time text, e.g. "6 hr 25 min".
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub stops: StopsValue,
    #[serde(default)]
    pub airline: String,
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: String,
}

/// A normalized one-way leg, ready for the append-only leg store.
///
/// Never updated after write; the leg store is an append-only log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegRecord {
    pub direction: Direction,
    pub destination: String,
    pub city_name: String,
    pub date: NaiveDate,
    pub price: u32,
    pub airline: String,
    /// Travel time in decimal hours, rounded to two places.
    pub duration_hrs: f64,
    /// Stop count; -1 when unknown.
    pub stops: i32,
    pub departure_time: String,
    pub arrival_time: String,
}
