//! Orchestrator integration tests.
//!
//! These exercise the full search run against a scripted mock backend:
//! retry behavior, durable legs and progress, resume, failure bookkeeping,
//! and interrupt safety.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tempfile::TempDir;

use farehound_core::{
    config::{OrchestratorConfig, PlanMode, SearchConfig},
    plan_tasks,
    testing::{fixtures, MockLegSearcher},
    CsvLegStore, Direction, ErrorLog, JsonProgressStore, LegStore, OrchestratorError, ProgressSet,
    ProgressStore, SearchOrchestrator, TaskKey,
};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// Test helper wiring all orchestrator dependencies into a temp dir.
struct TestHarness {
    searcher: Arc<MockLegSearcher>,
    leg_store: Arc<CsvLegStore>,
    progress_store: Arc<JsonProgressStore>,
    search_config: SearchConfig,
    orchestrator_config: OrchestratorConfig,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut destinations = BTreeMap::new();
        destinations.insert("CUN".to_string(), "Cancun".to_string());

        let search_config = SearchConfig {
            origin: "BOS".to_string(),
            destinations,
            adults: 2,
            max_stops: Some(1),
            max_duration_hrs: 10.0,
            trip_lengths: vec![2],
            plan_mode: PlanMode::PerDirection,
        };

        // Millisecond pacing so tests stay fast.
        let orchestrator_config = OrchestratorConfig {
            max_workers: 2,
            max_retries: 3,
            sleep_min_ms: 1,
            sleep_max_ms: 2,
            flush_every: 2,
            search_timeout_secs: 5,
        };

        Self {
            searcher: Arc::new(MockLegSearcher::new()),
            leg_store: Arc::new(CsvLegStore::new(temp_dir.path().join("legs.csv"))),
            progress_store: Arc::new(JsonProgressStore::in_dir(temp_dir.path())),
            search_config,
            orchestrator_config,
            temp_dir,
        }
    }

    fn orchestrator(&self) -> SearchOrchestrator {
        SearchOrchestrator::new(
            self.orchestrator_config.clone(),
            self.search_config.clone(),
            self.searcher.clone(),
            self.leg_store.clone(),
            self.progress_store.clone(),
            Arc::new(ErrorLog::new(self.temp_dir.path().join("errors.log"))),
        )
    }

    fn plan(&self, start: &str, end: &str, progress: &ProgressSet) -> Vec<farehound_core::SearchTask> {
        plan_tasks(
            &self.search_config,
            date(start),
            date(end),
            progress.completed(),
        )
    }
}

#[tokio::test]
async fn run_persists_legs_and_progress() {
    let harness = TestHarness::new();
    harness
        .searcher
        .set_default_offers(vec![
            fixtures::offer("JetBlue", "$300", "08:30"),
            fixtures::offer("Delta", "$350", "09:15"),
        ])
        .await;

    // One date plus a 2-day trailing return window: 2 + 2 tasks.
    let tasks = harness.plan("2026-05-01", "2026-05-01", &ProgressSet::new());
    assert_eq!(tasks.len(), 4);

    let orchestrator = harness.orchestrator();
    let (summary, progress) = orchestrator.run(tasks, ProgressSet::new()).await.unwrap();

    assert_eq!(summary.with_results, 4);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.legs_found, 8);

    // Legs are durable and carry both directions.
    let legs = harness.leg_store.load().unwrap();
    assert_eq!(legs.len(), 8);
    assert!(legs.iter().any(|l| l.direction == Direction::Outbound));
    assert!(legs.iter().any(|l| l.direction == Direction::Return));

    // Progress is durable: a fresh store sees every key.
    let reloaded = harness.progress_store.load().unwrap();
    assert_eq!(reloaded.completed_count(), 4);
    assert_eq!(progress.completed_count(), 4);

    // A resumed run has nothing left to do.
    assert!(harness.plan("2026-05-01", "2026-05-01", &reloaded).is_empty());
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let harness = TestHarness::new();
    harness
        .searcher
        .set_default_offers(vec![fixtures::offer("JetBlue", "$300", "08:30")])
        .await;
    // Outbound BOS->CUN fails twice, succeeds on the third attempt.
    harness
        .searcher
        .fail_next("BOS", "CUN", date("2026-05-01"), 2)
        .await;

    let tasks = harness.plan("2026-05-01", "2026-05-01", &ProgressSet::new());
    let (summary, _) = harness
        .orchestrator()
        .run(tasks, ProgressSet::new())
        .await
        .unwrap();

    assert_eq!(summary.with_results, 4);
    assert_eq!(summary.failed, 0);

    let searches = harness.searcher.recorded_searches().await;
    let outbound_attempts = searches
        .iter()
        .filter(|s| s.origin == "BOS" && s.date == date("2026-05-01"))
        .count();
    assert_eq!(outbound_attempts, 3);
}

#[tokio::test]
async fn exhausted_retries_mark_failed_but_completed() {
    let harness = TestHarness::new();
    harness
        .searcher
        .set_default_offers(vec![fixtures::offer("JetBlue", "$300", "08:30")])
        .await;
    harness
        .searcher
        .fail_next("BOS", "CUN", date("2026-05-01"), 99)
        .await;

    let tasks = harness.plan("2026-05-01", "2026-05-01", &ProgressSet::new());
    let (summary, progress) = harness
        .orchestrator()
        .run(tasks, ProgressSet::new())
        .await
        .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.with_results, 3);

    // Failed key is terminal for this run...
    let key = TaskKey::Leg(Direction::Outbound, "CUN".to_string(), date("2026-05-01"));
    assert!(progress.contains(&key));
    assert!(progress.failed().contains(&key));

    // ...and the failure is logged with the task identity.
    let log = std::fs::read_to_string(harness.temp_dir.path().join("errors.log")).unwrap();
    assert!(log.contains("outbound,CUN,2026-05-01"));

    // An operator can reopen just the failed key.
    let mut reloaded = harness.progress_store.load().unwrap();
    reloaded.retry_failed();
    let replanned = harness.plan("2026-05-01", "2026-05-01", &reloaded);
    assert_eq!(replanned.len(), 1);
    assert_eq!(replanned[0].key, key);
}

#[tokio::test]
async fn unwritable_leg_store_fails_the_run() {
    let harness = TestHarness::new();
    harness
        .searcher
        .set_default_offers(vec![fixtures::offer("JetBlue", "$300", "08:30")])
        .await;
    // A directory at the store path makes every append fail.
    std::fs::create_dir(harness.temp_dir.path().join("legs.csv")).unwrap();

    let tasks = harness.plan("2026-05-01", "2026-05-01", &ProgressSet::new());
    let result = harness.orchestrator().run(tasks, ProgressSet::new()).await;
    assert!(matches!(result, Err(OrchestratorError::Store(_))));

    // No key whose legs were lost is marked done, so a resume searches
    // everything again instead of silently skipping the lost results.
    let reloaded = harness.progress_store.load().unwrap();
    assert_eq!(reloaded.completed_count(), 0);
}

#[tokio::test]
async fn empty_results_complete_without_failure() {
    let harness = TestHarness::new();
    // Default offers stay empty: every search finds nothing.

    let tasks = harness.plan("2026-05-01", "2026-05-01", &ProgressSet::new());
    let (summary, progress) = harness
        .orchestrator()
        .run(tasks, ProgressSet::new())
        .await
        .unwrap();

    assert_eq!(summary.empty, 4);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.legs_found, 0);
    assert_eq!(progress.completed_count(), 4);
    assert!(progress.failed().is_empty());

    // Each empty task was still retried before giving up.
    assert_eq!(harness.searcher.search_count().await, 4 * 3);
}

#[tokio::test]
async fn completed_keys_are_not_resubmitted() {
    let harness = TestHarness::new();

    let mut progress = ProgressSet::new();
    progress.mark_completed(TaskKey::Leg(
        Direction::Outbound,
        "CUN".to_string(),
        date("2026-05-01"),
    ));

    let tasks = harness.plan("2026-05-01", "2026-05-01", &progress);
    assert_eq!(tasks.len(), 3);
    assert!(tasks
        .iter()
        .all(|t| t.key != TaskKey::Leg(Direction::Outbound, "CUN".to_string(), date("2026-05-01"))));
}

#[tokio::test]
async fn interrupt_preserves_observed_completions() {
    let mut harness = TestHarness::new();
    // Single worker and a wide date range so the run is interrupted mid-way.
    harness.orchestrator_config.max_workers = 1;
    harness.orchestrator_config.sleep_min_ms = 5;
    harness.orchestrator_config.sleep_max_ms = 10;
    harness
        .searcher
        .set_default_offers(vec![fixtures::offer("JetBlue", "$300", "08:30")])
        .await;

    let tasks = harness.plan("2026-05-01", "2026-05-10", &ProgressSet::new());
    let total = tasks.len();

    let orchestrator = harness.orchestrator();
    let shutdown = orchestrator.shutdown_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(40)).await;
        shutdown.shutdown();
    });

    let (summary, progress) = orchestrator.run(tasks, ProgressSet::new()).await.unwrap();

    assert!(summary.skipped > 0, "expected the interrupt to skip work");
    assert_eq!(summary.completed() + summary.skipped, total);

    // Every observed completion made it to the progress file despite the
    // interrupt arriving between periodic flushes.
    let reloaded = harness.progress_store.load().unwrap();
    assert_eq!(reloaded.completed_count(), summary.completed());
}

#[tokio::test]
async fn per_trip_task_searches_both_legs() {
    let mut harness = TestHarness::new();
    harness.search_config.plan_mode = PlanMode::PerTrip;
    harness.search_config.trip_lengths = vec![2];
    harness
        .searcher
        .set_route_offers(
            "BOS",
            "CUN",
            date("2026-05-01"),
            vec![fixtures::offer("JetBlue", "$300", "08:30")],
        )
        .await;
    harness
        .searcher
        .set_route_offers(
            "CUN",
            "BOS",
            date("2026-05-03"),
            vec![fixtures::offer("Delta", "$250", "17:00")],
        )
        .await;

    let tasks = harness.plan("2026-05-01", "2026-05-01", &ProgressSet::new());
    assert_eq!(tasks.len(), 1);
    assert_eq!(
        tasks[0].key,
        TaskKey::Trip("CUN".to_string(), date("2026-05-01"), 2)
    );

    let (summary, _) = harness
        .orchestrator()
        .run(tasks, ProgressSet::new())
        .await
        .unwrap();

    assert_eq!(summary.with_results, 1);
    assert_eq!(summary.legs_found, 2);

    let legs = harness.leg_store.load().unwrap();
    assert_eq!(legs.len(), 2);
    let outbound = legs.iter().find(|l| l.direction == Direction::Outbound).unwrap();
    let ret = legs.iter().find(|l| l.direction == Direction::Return).unwrap();
    assert_eq!(outbound.date, date("2026-05-01"));
    assert_eq!(outbound.airline, "JetBlue");
    assert_eq!(ret.date, date("2026-05-03"));
    assert_eq!(ret.airline, "Delta");
}
