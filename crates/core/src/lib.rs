pub mod combiner;
pub mod config;
pub mod extractor;
pub mod normalizer;
pub mod orchestrator;
pub mod planner;
pub mod report;
pub mod searcher;
pub mod store;
pub mod testing;

pub use combiner::{combine_legs, exclude_airlines, RoundTrip};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, PlanMode,
    SearcherBackend,
};
pub use extractor::{AnthropicClient, LlmClient};
pub use normalizer::{normalize_offers, LegRecord, RawOffer};
pub use orchestrator::{OrchestratorError, RunSummary, SearchOrchestrator, ShutdownHandle};
pub use planner::{date_range, plan_tasks, Direction, SearchTask, TaskKey};
pub use report::{booking_search_url, write_grouped_report, write_trips_csv, ReportContext, ReportError};
pub use searcher::{FlightsApiSearcher, LegSearcher, PageExtractSearcher, SearchError};
pub use store::{
    CsvLegStore, ErrorLog, JsonProgressStore, LegStore, ProgressSet, ProgressStore, StoreError,
};
