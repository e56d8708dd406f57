//! Search orchestrator implementation.
//!
//! Runs a fixed task list through a bounded worker pool: each task searches
//! one leg (or one combined trip), retries on errors and empty results with
//! randomized delays, appends normalized legs to the store as soon as they
//! are known, and flushes the progress set periodically and at shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::{broadcast, Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::{OrchestratorConfig, SearchConfig};
use crate::normalizer::{normalize_offers, LegRecord};
use crate::planner::{Direction, SearchTask, TaskKey};
use crate::searcher::{LegSearcher, SearchError, SearchRequest};
use crate::store::{ErrorLog, LegStore, ProgressSet, ProgressStore, StoreError};

use super::types::{OrchestratorError, RunSummary};

/// Mutable state shared by workers, guarded by one mutex so leg-store
/// appends and progress updates never interleave (single-writer discipline).
struct RunState {
    progress: ProgressSet,
    summary: RunSummary,
    completions_since_flush: usize,
    /// First leg-store write failure; set once and fatal for the run.
    store_failure: Option<StoreError>,
}

/// Outcome of one task after all retries.
enum TaskOutcome {
    Results(Vec<LegRecord>),
    Empty,
    Failed(SearchError),
    Skipped,
}

/// Handle for requesting a graceful stop from another task (e.g. ctrl-c).
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: broadcast::Sender<()>,
    stopping: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Stop dispatching new work; in-flight tasks finish or abandon their
    /// backoff, and the orchestrator performs a final progress flush.
    pub fn shutdown(&self) {
        if !self.stopping.swap(true, Ordering::SeqCst) {
            info!("Shutdown requested, draining in-flight searches");
        }
        let _ = self.tx.send(());
    }
}

/// The search orchestrator - drives the planned tasks through the search
/// backend with bounded parallelism.
pub struct SearchOrchestrator {
    config: OrchestratorConfig,
    search: SearchConfig,
    searcher: Arc<dyn LegSearcher>,
    leg_store: Arc<dyn LegStore>,
    progress_store: Arc<dyn ProgressStore>,
    error_log: Arc<ErrorLog>,
    shutdown_tx: broadcast::Sender<()>,
    stopping: Arc<AtomicBool>,
}

impl SearchOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        search: SearchConfig,
        searcher: Arc<dyn LegSearcher>,
        leg_store: Arc<dyn LegStore>,
        progress_store: Arc<dyn ProgressStore>,
        error_log: Arc<ErrorLog>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            search,
            searcher,
            leg_store,
            progress_store,
            error_log,
            shutdown_tx,
            stopping: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
            stopping: Arc::clone(&self.stopping),
        }
    }

    /// Run every task to completion (or until shutdown), returning the
    /// summary together with the final progress set.
    ///
    /// The progress set is flushed every `flush_every` completions and once
    /// more before returning, shutdown included - an interrupt never loses
    /// a completion that was already observed.
    pub async fn run(
        &self,
        tasks: Vec<SearchTask>,
        progress: ProgressSet,
    ) -> Result<(RunSummary, ProgressSet), OrchestratorError> {
        let total = tasks.len();
        info!(
            tasks = total,
            workers = self.config.max_workers,
            backend = self.searcher.backend_name(),
            "Starting search run"
        );

        let state = Arc::new(Mutex::new(RunState {
            progress,
            summary: RunSummary {
                submitted: total,
                ..RunSummary::default()
            },
            completions_since_flush: 0,
            store_failure: None,
        }));

        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let mut join_set = JoinSet::new();

        for task in tasks {
            let semaphore = Arc::clone(&semaphore);
            let state = Arc::clone(&state);
            let searcher = Arc::clone(&self.searcher);
            let leg_store = Arc::clone(&self.leg_store);
            let progress_store = Arc::clone(&self.progress_store);
            let error_log = Arc::clone(&self.error_log);
            let stopping = Arc::clone(&self.stopping);
            let shutdown_rx = self.shutdown_tx.subscribe();
            let shutdown = self.shutdown_handle();
            let config = self.config.clone();
            let search = self.search.clone();

            join_set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore closed while run in progress");

                let worker = TaskWorker {
                    config,
                    search,
                    searcher,
                    stopping,
                    shutdown_rx,
                };
                let flush_every = worker.config.flush_every;
                let outcome = worker.execute(&task).await;

                finish_task(
                    &task.key,
                    outcome,
                    total,
                    flush_every,
                    &state,
                    leg_store.as_ref(),
                    progress_store.as_ref(),
                    error_log.as_ref(),
                    &shutdown,
                )
                .await;
            });
        }

        while let Some(joined) = join_set.join_next().await {
            if let Err(e) = joined {
                warn!("Search worker panicked: {}", e);
            }
        }

        let mut state = state.lock().await;

        // Final flush, unconditional: normal end, interrupt, and storage
        // failure alike.
        if let Some(store_failure) = state.store_failure.take() {
            if let Err(e) = self.progress_store.save(&state.progress) {
                warn!(error = %e, "Failed to flush progress");
            }
            return Err(store_failure.into());
        }
        self.progress_store.save(&state.progress)?;

        info!(
            with_results = state.summary.with_results,
            empty = state.summary.empty,
            failed = state.summary.failed,
            skipped = state.summary.skipped,
            legs = state.summary.legs_found,
            "Search run finished"
        );
        Ok((state.summary.clone(), state.progress.clone()))
    }
}

/// Per-task execution: retries, timeouts, politeness delays.
struct TaskWorker {
    config: OrchestratorConfig,
    search: SearchConfig,
    searcher: Arc<dyn LegSearcher>,
    stopping: Arc<AtomicBool>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl TaskWorker {
    async fn execute(mut self, task: &SearchTask) -> TaskOutcome {
        if self.stopping.load(Ordering::SeqCst) {
            return TaskOutcome::Skipped;
        }

        let mut last_error = None;

        for attempt in 1..=self.config.max_retries {
            match self.attempt(task).await {
                Ok(legs) if !legs.is_empty() => {
                    self.politeness_delay().await;
                    return TaskOutcome::Results(legs);
                }
                Ok(_) => {
                    debug!(task = %task.key, attempt, "Search returned no offers");
                    last_error = None;
                }
                Err(e) => {
                    debug!(task = %task.key, attempt, error = %e, "Search attempt failed");
                    last_error = Some(e);
                }
            }

            if attempt < self.config.max_retries {
                if !self.backoff_delay(task, attempt).await {
                    // Shutdown arrived mid-backoff; abandon without a result.
                    return TaskOutcome::Skipped;
                }
            }
        }

        self.politeness_delay().await;
        match last_error {
            Some(e) => TaskOutcome::Failed(e),
            None => TaskOutcome::Empty,
        }
    }

    /// One search attempt; per-trip tasks search both legs as one unit.
    async fn attempt(&self, task: &SearchTask) -> Result<Vec<LegRecord>, SearchError> {
        match task.key {
            TaskKey::Leg(direction, _, _) => {
                self.search_leg(task, direction, task.date, &task.origin, &task.destination)
                    .await
            }
            TaskKey::Trip(_, _, trip_length) => {
                let return_date = task.date + chrono::Duration::days(i64::from(trip_length));
                let mut legs = self
                    .search_leg(
                        task,
                        Direction::Outbound,
                        task.date,
                        &task.origin,
                        &task.destination,
                    )
                    .await?;
                let returns = self
                    .search_leg(
                        task,
                        Direction::Return,
                        return_date,
                        &task.destination,
                        &task.origin,
                    )
                    .await?;
                legs.extend(returns);
                Ok(legs)
            }
        }
    }

    async fn search_leg(
        &self,
        task: &SearchTask,
        direction: Direction,
        date: chrono::NaiveDate,
        origin: &str,
        destination: &str,
    ) -> Result<Vec<LegRecord>, SearchError> {
        let request = SearchRequest {
            origin: origin.to_string(),
            destination: destination.to_string(),
            date,
            adults: self.search.adults,
            max_stops: self.search.max_stops,
        };

        let timeout = Duration::from_secs(self.config.search_timeout_secs);
        let offers = match tokio::time::timeout(timeout, self.searcher.search(&request)).await {
            Ok(result) => result?,
            Err(_) => return Err(SearchError::Timeout),
        };

        Ok(normalize_offers(
            direction,
            &task.dest_code,
            &task.city_name,
            date,
            &offers,
            self.search.max_duration_hrs,
        ))
    }

    /// Randomized delay before the next retry; per-trip tasks scale the
    /// window by attempt number. Returns false when shutdown interrupted it.
    async fn backoff_delay(&mut self, task: &SearchTask, attempt: u32) -> bool {
        let factor = if task.trip_length.is_some() {
            u64::from(attempt)
        } else {
            1
        };
        self.random_sleep(factor).await
    }

    /// Politeness pause after a task so the remote source sees human pacing.
    async fn politeness_delay(&mut self) {
        self.random_sleep(1).await;
    }

    async fn random_sleep(&mut self, factor: u64) -> bool {
        let (min, max) = (
            self.config.sleep_min_ms * factor,
            self.config.sleep_max_ms * factor,
        );
        let millis = if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        };

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(millis)) => true,
            _ = self.shutdown_rx.recv() => false,
        }
    }
}

/// Record a task's outcome: append legs, update progress, flush if due.
/// All under one lock so the stores only ever see one writer.
#[allow(clippy::too_many_arguments)]
async fn finish_task(
    key: &TaskKey,
    outcome: TaskOutcome,
    total: usize,
    flush_every: usize,
    state: &Mutex<RunState>,
    leg_store: &dyn LegStore,
    progress_store: &dyn ProgressStore,
    error_log: &ErrorLog,
    shutdown: &ShutdownHandle,
) {
    let mut state = state.lock().await;

    match outcome {
        TaskOutcome::Skipped => {
            state.summary.skipped += 1;
            return;
        }
        TaskOutcome::Results(legs) => {
            // Persist immediately so partial progress survives a crash. An
            // unwritable store is fatal: the key stays incomplete so a
            // resume searches it again, and the whole run stops.
            if let Err(e) = leg_store.append(&legs) {
                error!(task = %key, error = %e, "Leg store unwritable, stopping run");
                if state.store_failure.is_none() {
                    state.store_failure = Some(e);
                }
                shutdown.shutdown();
                return;
            }
            state.summary.legs_found += legs.len();
            let cheapest = legs.iter().map(|l| l.price).min().unwrap_or(0);
            state.summary.with_results += 1;
            state.progress.mark_completed(key.clone());
            info!(
                task = %key,
                done = state.summary.completed(),
                total,
                legs = legs.len(),
                best_price = cheapest,
                "Search complete"
            );
        }
        TaskOutcome::Empty => {
            state.summary.empty += 1;
            state.progress.mark_completed(key.clone());
            info!(
                task = %key,
                done = state.summary.completed(),
                total,
                "Search complete, no usable offers"
            );
        }
        TaskOutcome::Failed(e) => {
            // Give up on this key for the whole run; it stays resumable by
            // retrying failed keys or clearing progress.
            if let Err(log_err) = error_log.append(&key.identity(), &e.to_string()) {
                warn!(task = %key, error = %log_err, "Failed to write error log");
            }
            state.summary.failed += 1;
            state.progress.mark_failed(key.clone());
            warn!(
                task = %key,
                done = state.summary.completed(),
                total,
                error = %e,
                "Search failed after retries"
            );
        }
    }

    state.completions_since_flush += 1;
    if state.completions_since_flush >= flush_every {
        if let Err(e) = progress_store.save(&state.progress) {
            warn!(error = %e, "Failed to flush progress");
        } else {
            state.completions_since_flush = 0;
        }
    }
}
