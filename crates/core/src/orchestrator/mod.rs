//! Search orchestrator for the fare survey pipeline.
//!
//! Executes planned search tasks against a `LegSearcher` backend with:
//! - **Bounded parallelism**: a small worker pool (polite by default)
//! - **Retry with jitter**: errors and empty results retried with
//!   randomized delays
//! - **Durable progress**: legs appended as soon as observed, progress
//!   flushed periodically and on shutdown

mod runner;
mod types;

pub use runner::{SearchOrchestrator, ShutdownHandle};
pub use types::{OrchestratorError, RunSummary};
