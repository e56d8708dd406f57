//! Expansion of the destination x date (x trip-length) matrix into tasks.

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::config::{PlanMode, SearchConfig};

use super::types::{Direction, SearchTask, TaskKey};

/// All dates in the inclusive range.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current);
        current = current.succ_opt().expect("date overflow");
    }
    dates
}

/// Expand the search matrix into tasks, skipping keys already completed.
///
/// Output order is stable (destination, then date) but the orchestrator
/// consumes tasks concurrently so the order carries no meaning.
pub fn plan_tasks(
    config: &SearchConfig,
    start: NaiveDate,
    end: NaiveDate,
    completed: &HashSet<TaskKey>,
) -> Vec<SearchTask> {
    match config.plan_mode {
        PlanMode::PerDirection => plan_per_direction(config, start, end, completed),
        PlanMode::PerTrip => plan_per_trip(config, start, end, completed),
    }
}

fn plan_per_direction(
    config: &SearchConfig,
    start: NaiveDate,
    end: NaiveDate,
    completed: &HashSet<TaskKey>,
) -> Vec<SearchTask> {
    let dates = date_range(start, end);
    let mut tasks = Vec::new();

    for (dest_code, city_name) in &config.destinations {
        for &date in &dates {
            let key_out = TaskKey::Leg(Direction::Outbound, dest_code.clone(), date);
            if !completed.contains(&key_out) {
                tasks.push(SearchTask {
                    key: key_out,
                    origin: config.origin.clone(),
                    destination: dest_code.clone(),
                    dest_code: dest_code.clone(),
                    city_name: city_name.clone(),
                    date,
                    trip_length: None,
                });
            }

            let key_ret = TaskKey::Leg(Direction::Return, dest_code.clone(), date);
            if !completed.contains(&key_ret) {
                tasks.push(SearchTask {
                    key: key_ret,
                    origin: dest_code.clone(),
                    destination: config.origin.clone(),
                    dest_code: dest_code.clone(),
                    city_name: city_name.clone(),
                    date,
                    trip_length: None,
                });
            }
        }
    }

    // Trailing return window: trips departing near the end of the range
    // return after it, so return legs must be searched out to
    // end + max(trip_lengths) or those trips silently lose their return leg.
    let max_trip = config.trip_lengths.iter().copied().max().unwrap_or(0);
    let extra_end = end + chrono::Duration::days(i64::from(max_trip));
    let mut extra_date = end + chrono::Duration::days(1);
    while extra_date <= extra_end {
        for (dest_code, city_name) in &config.destinations {
            let key_ret = TaskKey::Leg(Direction::Return, dest_code.clone(), extra_date);
            if !completed.contains(&key_ret) {
                tasks.push(SearchTask {
                    key: key_ret,
                    origin: dest_code.clone(),
                    destination: config.origin.clone(),
                    dest_code: dest_code.clone(),
                    city_name: city_name.clone(),
                    date: extra_date,
                    trip_length: None,
                });
            }
        }
        extra_date += chrono::Duration::days(1);
    }

    tasks
}

fn plan_per_trip(
    config: &SearchConfig,
    start: NaiveDate,
    end: NaiveDate,
    completed: &HashSet<TaskKey>,
) -> Vec<SearchTask> {
    let dates = date_range(start, end);
    let mut tasks = Vec::new();

    for (dest_code, city_name) in &config.destinations {
        for &date in &dates {
            for &trip_length in &config.trip_lengths {
                let key = TaskKey::Trip(dest_code.clone(), date, trip_length);
                if completed.contains(&key) {
                    continue;
                }
                tasks.push(SearchTask {
                    key,
                    origin: config.origin.clone(),
                    destination: dest_code.clone(),
                    dest_code: dest_code.clone(),
                    city_name: city_name.clone(),
                    date,
                    trip_length: Some(trip_length),
                });
            }
        }
    }

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn config(plan_mode: PlanMode) -> SearchConfig {
        let mut destinations = BTreeMap::new();
        destinations.insert("CUN".to_string(), "Cancun".to_string());
        destinations.insert("PUJ".to_string(), "Punta Cana".to_string());
        SearchConfig {
            origin: "BOS".to_string(),
            destinations,
            adults: 2,
            max_stops: Some(1),
            max_duration_hrs: 10.0,
            trip_lengths: vec![3, 4],
            plan_mode,
        }
    }

    #[test]
    fn date_range_is_inclusive() {
        let dates = date_range(date("2026-05-01"), date("2026-05-03"));
        assert_eq!(
            dates,
            vec![date("2026-05-01"), date("2026-05-02"), date("2026-05-03")]
        );
    }

    #[test]
    fn per_direction_emits_both_directions_per_destination_date() {
        let tasks = plan_tasks(
            &config(PlanMode::PerDirection),
            date("2026-05-01"),
            date("2026-05-02"),
            &HashSet::new(),
        );

        // 2 destinations x 2 dates x 2 directions, plus the trailing return
        // window: 4 extra dates x 2 destinations.
        assert_eq!(tasks.len(), 2 * 2 * 2 + 4 * 2);

        let outbound = tasks
            .iter()
            .find(|t| t.key == TaskKey::Leg(Direction::Outbound, "CUN".into(), date("2026-05-01")))
            .unwrap();
        assert_eq!(outbound.origin, "BOS");
        assert_eq!(outbound.destination, "CUN");

        let ret = tasks
            .iter()
            .find(|t| t.key == TaskKey::Leg(Direction::Return, "CUN".into(), date("2026-05-01")))
            .unwrap();
        assert_eq!(ret.origin, "CUN");
        assert_eq!(ret.destination, "BOS");
    }

    #[test]
    fn trailing_window_covers_max_trip_length() {
        let tasks = plan_tasks(
            &config(PlanMode::PerDirection),
            date("2026-05-01"),
            date("2026-05-02"),
            &HashSet::new(),
        );

        // max trip length 4 -> returns searched through 2026-05-06
        for day in 3..=6 {
            let extra = date(&format!("2026-05-0{}", day));
            assert!(
                tasks
                    .iter()
                    .any(|t| t.key == TaskKey::Leg(Direction::Return, "CUN".into(), extra)),
                "missing trailing return for {}",
                extra
            );
        }
        // No outbound tasks beyond the range end
        assert!(!tasks
            .iter()
            .any(|t| t.key
                == TaskKey::Leg(Direction::Outbound, "CUN".into(), date("2026-05-03"))));
    }

    #[test]
    fn completed_keys_are_never_resubmitted() {
        let mut completed = HashSet::new();
        completed.insert(TaskKey::Leg(
            Direction::Outbound,
            "CUN".to_string(),
            date("2026-05-01"),
        ));

        let tasks = plan_tasks(
            &config(PlanMode::PerDirection),
            date("2026-05-01"),
            date("2026-05-01"),
            &completed,
        );

        assert!(!tasks.iter().any(|t| completed.contains(&t.key)));
    }

    #[test]
    fn per_trip_emits_one_task_per_length() {
        let tasks = plan_tasks(
            &config(PlanMode::PerTrip),
            date("2026-05-01"),
            date("2026-05-01"),
            &HashSet::new(),
        );

        // 2 destinations x 1 date x 2 trip lengths
        assert_eq!(tasks.len(), 4);
        assert!(tasks.iter().all(|t| t.trip_length.is_some()));
        assert!(tasks
            .iter()
            .any(|t| t.key == TaskKey::Trip("PUJ".into(), date("2026-05-01"), 4)));
    }
}
