//! Search task planning.
//!
//! Expands the configured destination x date (x trip-length) matrix into a
//! flat list of search tasks, excluding keys that previous runs already
//! completed. Return-leg coverage extends past the end of the date range by
//! the longest configured trip so late departures still find a return leg.

mod plan;
mod types;

pub use plan::{date_range, plan_tasks};
pub use types::{Direction, SearchTask, TaskKey};
