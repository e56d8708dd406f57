//! Round-trip combination.
//!
//! Joins outbound and return legs per (destination, date), picks the
//! cheapest leg on each side, and builds ranked round trips for every
//! configured trip length. Pure over the leg store: rerunning with
//! unchanged legs yields identical output.

mod types;

pub use types::RoundTrip;

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

use crate::normalizer::LegRecord;
use crate::planner::Direction;

/// Cheapest leg per (destination, date), ties broken deterministically by
/// stable sort on price (first occurrence in store order wins).
fn best_legs(legs: &[&LegRecord]) -> HashMap<(String, NaiveDate), LegRecord> {
    let mut sorted: Vec<&LegRecord> = legs.to_vec();
    sorted.sort_by_key(|leg| leg.price);

    let mut best = HashMap::new();
    for leg in sorted {
        best.entry((leg.destination.clone(), leg.date))
            .or_insert_with(|| (*leg).clone());
    }
    best
}

/// Build ranked round trips from the leg store contents.
///
/// An empty outbound or return partition yields an empty result without
/// error; that is the normal state early in a run.
pub fn combine_legs(legs: &[LegRecord], trip_lengths: &[u32]) -> Vec<RoundTrip> {
    let outbound: Vec<&LegRecord> = legs
        .iter()
        .filter(|leg| leg.direction == Direction::Outbound)
        .collect();
    let returns: Vec<&LegRecord> = legs
        .iter()
        .filter(|leg| leg.direction == Direction::Return)
        .collect();

    if outbound.is_empty() || returns.is_empty() {
        return Vec::new();
    }

    let best_outbound = best_legs(&outbound);
    let best_return = best_legs(&returns);

    // Deterministic outbound visit order keeps the output byte-identical
    // across runs regardless of hash-map iteration order.
    let mut outbound_keys: Vec<&(String, NaiveDate)> = best_outbound.keys().collect();
    outbound_keys.sort();

    let mut trips = Vec::new();
    for key in outbound_keys {
        let out_leg = &best_outbound[key];
        for &trip_days in trip_lengths {
            let return_date = out_leg.date + Duration::days(i64::from(trip_days));
            // No return inventory for this date is not an error, just no trip.
            let Some(ret_leg) = best_return.get(&(out_leg.destination.clone(), return_date))
            else {
                continue;
            };

            trips.push(RoundTrip {
                destination: out_leg.destination.clone(),
                city_name: out_leg.city_name.clone(),
                depart_date: out_leg.date,
                return_date,
                trip_days,
                outbound_price: out_leg.price,
                return_price: ret_leg.price,
                total_price: out_leg.price + ret_leg.price,
                outbound_airline: out_leg.airline.clone(),
                return_airline: ret_leg.airline.clone(),
                outbound_duration_hrs: out_leg.duration_hrs,
                return_duration_hrs: ret_leg.duration_hrs,
                outbound_stops: out_leg.stops,
                return_stops: ret_leg.stops,
            });
        }
    }

    trips.sort_by_key(|trip| trip.total_price);
    trips
}

/// Drop legs whose airline matches any of the given names
/// (case-insensitive substring match).
///
/// Views like "no budget airlines" must filter the RAW legs and re-combine;
/// filtering already-combined trips would miss the cheaper non-budget
/// alternative that existed on the other side of the pairing.
pub fn exclude_airlines(legs: &[LegRecord], airlines: &[String]) -> Vec<LegRecord> {
    let needles: Vec<String> = airlines.iter().map(|a| a.to_lowercase()).collect();
    legs.iter()
        .filter(|leg| {
            let airline = leg.airline.to_lowercase();
            !needles.iter().any(|needle| airline.contains(needle))
        })
        .cloned()
        .collect()
}
