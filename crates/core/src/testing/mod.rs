//! Testing utilities and mock implementations for integration tests.
//!
//! Provides a scriptable `LegSearcher` so orchestrator behavior (retries,
//! resume, interrupt safety) can be tested without any real backend.

mod mock_searcher;

pub use mock_searcher::MockLegSearcher;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::normalizer::{LegRecord, RawOffer};
    use crate::planner::Direction;
    use chrono::NaiveDate;

    /// Create a raw offer with reasonable defaults.
    pub fn offer(airline: &str, price: &str, departure_time: &str) -> RawOffer {
        RawOffer {
            price: price.to_string(),
            duration: "4 hr 30 min".to_string(),
            stops: "Nonstop".into(),
            airline: airline.to_string(),
            departure_time: departure_time.to_string(),
            arrival_time: "14:45".to_string(),
        }
    }

    /// Create a normalized leg record with reasonable defaults.
    pub fn leg(
        direction: Direction,
        dest: &str,
        city: &str,
        date: NaiveDate,
        price: u32,
        airline: &str,
    ) -> LegRecord {
        LegRecord {
            direction,
            destination: dest.to_string(),
            city_name: city.to_string(),
            date,
            price,
            airline: airline.to_string(),
            duration_hrs: 4.5,
            stops: 0,
            departure_time: "08:30".to_string(),
            arrival_time: "13:00".to_string(),
        }
    }
}
