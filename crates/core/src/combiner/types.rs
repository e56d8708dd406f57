//! Round-trip record derived from the leg store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One ranked round-trip combination.
///
/// Always rebuilt fresh from the leg store, never persisted incrementally.
/// Invariants: `total_price = outbound_price + return_price` and
/// `return_date = depart_date + trip_days`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTrip {
    pub destination: String,
    pub city_name: String,
    pub depart_date: NaiveDate,
    pub return_date: NaiveDate,
    pub trip_days: u32,
    pub outbound_price: u32,
    pub return_price: u32,
    pub total_price: u32,
    pub outbound_airline: String,
    pub return_airline: String,
    pub outbound_duration_hrs: f64,
    pub return_duration_hrs: f64,
    pub outbound_stops: i32,
    pub return_stops: i32,
}
