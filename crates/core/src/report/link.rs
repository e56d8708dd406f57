//! Booking-search deep links.

use chrono::NaiveDate;

/// Build a round-trip booking-search URL that bypasses the search form,
/// with the outbound and return slices as a URL-encoded JSON payload.
pub fn booking_search_url(
    base_url: &str,
    origin: &str,
    destination: &str,
    depart_date: NaiveDate,
    return_date: NaiveDate,
    adults: u32,
) -> String {
    let slices = serde_json::json!([
        {"orig": origin, "dest": destination, "date": depart_date.to_string()},
        {"orig": destination, "dest": origin, "date": return_date.to_string()},
    ])
    .to_string();

    format!(
        "{}?locale=en_US&type=RoundTrip&adult={}&slices={}",
        base_url.trim_end_matches('/'),
        adults,
        urlencoding::encode(&slices),
    )
}
