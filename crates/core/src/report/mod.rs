//! Report exports: the ranked-trips CSV and the grouped per-destination
//! report with booking deep links.

mod link;

pub use link::booking_search_url;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use thiserror::Error;

use crate::combiner::{combine_legs, exclude_airlines, RoundTrip};
use crate::config::ReportConfig;
use crate::normalizer::LegRecord;
use crate::store::csv::push_row;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

const TRIPS_HEADER: &str = "destination,city_name,depart_date,return_date,trip_days,\
outbound_price,return_price,total_price,outbound_airline,return_airline,\
outbound_duration_hrs,return_duration_hrs,outbound_stops,return_stops";

/// Write the full ranked-trips CSV (already sorted by the combiner).
pub fn write_trips_csv(path: &Path, trips: &[RoundTrip]) -> Result<(), ReportError> {
    let mut out = String::new();
    out.push_str(TRIPS_HEADER);
    out.push('\n');

    for trip in trips {
        let fields = [
            trip.destination.clone(),
            trip.city_name.clone(),
            trip.depart_date.to_string(),
            trip.return_date.to_string(),
            trip.trip_days.to_string(),
            trip.outbound_price.to_string(),
            trip.return_price.to_string(),
            trip.total_price.to_string(),
            trip.outbound_airline.clone(),
            trip.return_airline.clone(),
            trip.outbound_duration_hrs.to_string(),
            trip.return_duration_hrs.to_string(),
            trip.outbound_stops.to_string(),
            trip.return_stops.to_string(),
        ];
        push_row(&mut out, &fields);
    }

    std::fs::write(path, out).map_err(|e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Inputs the grouped report needs beyond the trips themselves.
pub struct ReportContext<'a> {
    pub origin: &'a str,
    pub adults: u32,
    pub trip_lengths: &'a [u32],
    pub config: &'a ReportConfig,
}

/// Write the grouped markdown report: per destination (sorted by city
/// name), the top-N cheapest trips, in two views: all airlines and the
/// budget-excluded rebuild.
///
/// The no-budget view filters the RAW legs and re-runs combination, so a
/// non-budget alternative on one side of a pairing still surfaces.
pub fn write_grouped_report(
    path: &Path,
    trips: &[RoundTrip],
    legs: &[LegRecord],
    ctx: &ReportContext<'_>,
) -> Result<(), ReportError> {
    let mut out = String::new();
    out.push_str("# Round-trip fare report\n");

    write_section(&mut out, "All airlines", trips, ctx);

    let non_budget_legs = exclude_airlines(legs, &ctx.config.budget_airlines);
    let no_budget_trips = combine_legs(&non_budget_legs, ctx.trip_lengths);
    write_section(&mut out, "No budget airlines", &no_budget_trips, ctx);

    std::fs::write(path, out).map_err(|e| ReportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn write_section(out: &mut String, title: &str, trips: &[RoundTrip], ctx: &ReportContext<'_>) {
    let _ = writeln!(out, "\n## {}\n", title);

    if trips.is_empty() {
        out.push_str("No round trips found.\n");
        return;
    }

    // Group by city name; BTreeMap gives the alphabetical destination order.
    let mut by_city: BTreeMap<&str, Vec<&RoundTrip>> = BTreeMap::new();
    for trip in trips {
        by_city.entry(&trip.city_name).or_default().push(trip);
    }

    for (city, group) in by_city {
        let _ = writeln!(out, "### {} ({})\n", city, group[0].destination);

        let header_link = if ctx.config.booking_url.is_some() {
            " Book |"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "| Depart | Return | Days | Total | Outbound | Return | Out hrs | Ret hrs | Out stops | Ret stops |{}",
            header_link
        );
        let _ = writeln!(
            out,
            "|--------|--------|------|-------|----------|--------|---------|---------|-----------|-----------|{}",
            if header_link.is_empty() { "" } else { "------|" }
        );

        // Trips arrive ranked by total price; top-N per destination.
        for trip in group.iter().take(ctx.config.top_n) {
            let _ = write!(
                out,
                "| {} | {} | {} | ${} | {} (${}) | {} (${}) | {} | {} | {} | {} |",
                trip.depart_date,
                trip.return_date,
                trip.trip_days,
                trip.total_price,
                trip.outbound_airline,
                trip.outbound_price,
                trip.return_airline,
                trip.return_price,
                trip.outbound_duration_hrs,
                trip.return_duration_hrs,
                trip.outbound_stops,
                trip.return_stops,
            );
            if let Some(base_url) = &ctx.config.booking_url {
                let url = booking_search_url(
                    base_url,
                    ctx.origin,
                    &trip.destination,
                    trip.depart_date,
                    trip.return_date,
                    ctx.adults,
                );
                let _ = write!(out, " [Search]({}) |", url);
            }
            out.push('\n');
        }
        out.push('\n');
    }
}
