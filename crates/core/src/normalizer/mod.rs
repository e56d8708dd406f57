//! Offer normalization.
//!
//! Turns the unstructured offers a search backend returns into typed
//! `LegRecord`s: parses duration/price/stops text, drops offers that fail to
//! parse or exceed the travel-time cap, and deduplicates offers that share
//! (airline, departure time, price).

mod parse;
mod types;

pub use parse::{parse_duration_hrs, parse_price, parse_stops};
pub use types::{LegRecord, RawOffer, StopsValue};

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::planner::Direction;

/// Normalize raw offers for one (direction, destination, date) search.
///
/// Offers with unparseable duration or price are dropped, as is anything
/// with `duration >= max_duration_hrs` (strict less-than keeps a 9.99 hr leg
/// under a 10 hr cap). Duplicates by (airline, departure_time, price) keep
/// the first occurrence in input order.
pub fn normalize_offers(
    direction: Direction,
    dest_code: &str,
    city_name: &str,
    date: NaiveDate,
    offers: &[RawOffer],
    max_duration_hrs: f64,
) -> Vec<LegRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for offer in offers {
        let Some(duration_hrs) = parse_duration_hrs(&offer.duration) else {
            continue;
        };
        let Some(price) = parse_price(&offer.price) else {
            continue;
        };
        if duration_hrs >= max_duration_hrs {
            continue;
        }

        let key = (offer.airline.clone(), offer.departure_time.clone(), price);
        if !seen.insert(key) {
            continue;
        }

        records.push(LegRecord {
            direction,
            destination: dest_code.to_string(),
            city_name: city_name.to_string(),
            date,
            price,
            airline: offer.airline.clone(),
            duration_hrs: (duration_hrs * 100.0).round() / 100.0,
            stops: parse_stops(&offer.stops),
            departure_time: offer.departure_time.clone(),
            arrival_time: offer.arrival_time.clone(),
        });
    }

    records
}
