//! Field parsers for unstructured offer text.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use super::types::StopsValue;

static HOURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*hr").unwrap());
static MINUTES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*min").unwrap());
static PRICE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$?([\d,]+)").unwrap());
static INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").unwrap());

/// Parse a duration string like "6 hr 25 min" into decimal hours.
///
/// Hour and minute parts are matched independently and default to zero when
/// absent, so "45 min" parses to 0.75. Empty input yields `None`.
pub fn parse_duration_hrs(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    let hours: u32 = first_int(&HOURS_RE, text).unwrap_or(0);
    let minutes: u32 = first_int(&MINUTES_RE, text).unwrap_or(0);
    Some(f64::from(hours) + f64::from(minutes) / 60.0)
}

/// Parse a price string like "$507" or "$1,234" into whole currency units.
pub fn parse_price(text: &str) -> Option<u32> {
    if text.is_empty() {
        return None;
    }
    let captures = PRICE_RE.captures(text)?;
    captures[1].replace(',', "").parse().ok()
}

/// Parse a stops field into an integer count; -1 means unknown.
pub fn parse_stops(value: &StopsValue) -> i32 {
    let text = match value {
        // A count outside i32 range is garbage input, not a real stop count.
        StopsValue::Count(count) => return i32::try_from(*count).unwrap_or(-1),
        StopsValue::Text(text) => text,
    };
    if text.is_empty() || text == "Unknown" {
        return -1;
    }
    if text.to_lowercase().contains("nonstop") {
        return 0;
    }
    first_int(&INT_RE, text).map(|n: u32| n as i32).unwrap_or(-1)
}

fn first_int<T: std::str::FromStr>(re: &Regex, text: &str) -> Option<T> {
    re.captures(text).and_then(|c| c[1].parse().ok())
}
