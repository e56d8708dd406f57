use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub search: SearchConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    pub searcher: SearcherConfig,
    #[serde(default)]
    pub extractor: Option<ExtractorConfig>,
    #[serde(default)]
    pub report: ReportConfig,
}

/// How the destination x date matrix is expanded into search tasks.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    /// One outbound and one return search per (destination, date);
    /// round trips are assembled in post-processing.
    PerDirection,
    /// One combined search per (destination, date, trip length).
    PerTrip,
}

/// What to search: home airport, destinations, date matrix shape.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Home airport IATA code (e.g. "BOS").
    pub origin: String,
    /// Destination IATA code -> display city name.
    pub destinations: BTreeMap<String, String>,
    #[serde(default = "default_adults")]
    pub adults: u32,
    /// Maximum stops to request from the search backend, if it supports it.
    #[serde(default)]
    pub max_stops: Option<u32>,
    /// Legs at or above this travel time are dropped.
    #[serde(default = "default_max_duration_hrs")]
    pub max_duration_hrs: f64,
    /// Trip lengths (days between outbound and return departure) to build.
    #[serde(default = "default_trip_lengths")]
    pub trip_lengths: Vec<u32>,
    #[serde(default = "default_plan_mode")]
    pub plan_mode: PlanMode,
}

fn default_adults() -> u32 {
    2
}

fn default_max_duration_hrs() -> f64 {
    10.0
}

fn default_trip_lengths() -> Vec<u32> {
    vec![3, 4, 5, 6]
}

fn default_plan_mode() -> PlanMode {
    PlanMode::PerDirection
}

/// Orchestrator pacing and durability knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrchestratorConfig {
    /// Concurrent search workers. Keep low to stay polite to the source.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Attempts per task before giving up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Politeness delay window between requests, milliseconds.
    #[serde(default = "default_sleep_min_ms")]
    pub sleep_min_ms: u64,
    #[serde(default = "default_sleep_max_ms")]
    pub sleep_max_ms: u64,
    /// Flush progress to disk every this many completions.
    #[serde(default = "default_flush_every")]
    pub flush_every: usize,
    /// Upper bound on a single search attempt, seconds.
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            max_retries: default_max_retries(),
            sleep_min_ms: default_sleep_min_ms(),
            sleep_max_ms: default_sleep_max_ms(),
            flush_every: default_flush_every(),
            search_timeout_secs: default_search_timeout_secs(),
        }
    }
}

fn default_max_workers() -> usize {
    3
}

fn default_max_retries() -> u32 {
    3
}

fn default_sleep_min_ms() -> u64 {
    1000
}

fn default_sleep_max_ms() -> u64 {
    3000
}

fn default_flush_every() -> usize {
    20
}

fn default_search_timeout_secs() -> u64 {
    45
}

/// Search backend selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearcherConfig {
    pub backend: SearcherBackend,
    /// Required when backend = "flights_api".
    #[serde(default)]
    pub flights_api: Option<FlightsApiConfig>,
    /// Required when backend = "page_extract".
    #[serde(default)]
    pub page_extract: Option<PageExtractConfig>,
}

/// Available search backends
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearcherBackend {
    /// Structured offers from a flights API wrapper.
    FlightsApi,
    /// Raw results page fetched over HTTP, offers extracted by an LLM.
    PageExtract,
}

/// Flights API wrapper backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlightsApiConfig {
    /// Base URL of the API wrapper (e.g. "http://localhost:8933").
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

/// Raw-page backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageExtractConfig {
    /// Base booking-search URL the query string is appended to.
    pub search_url: String,
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

fn default_backend_timeout() -> u64 {
    30
}

/// LLM extraction configuration (required for the page_extract backend).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    pub api_key: String,
    #[serde(default = "default_extractor_model")]
    pub model: String,
    /// Override the provider API base URL (useful for proxies and tests).
    #[serde(default)]
    pub api_base: Option<String>,
    /// Cleaned markup is truncated to this many characters before prompting.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

fn default_extractor_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_max_content_chars() -> usize {
    100_000
}

/// Report shaping knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// Cheapest trips listed per destination in the grouped report.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Airlines excluded (substring match) from the no-budget view.
    #[serde(default = "default_budget_airlines")]
    pub budget_airlines: Vec<String>,
    /// Base booking-search URL for per-trip deep links; links are omitted
    /// when unset.
    #[serde(default)]
    pub booking_url: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            budget_airlines: default_budget_airlines(),
            booking_url: None,
        }
    }
}

fn default_top_n() -> usize {
    5
}

fn default_budget_airlines() -> Vec<String> {
    vec!["Frontier".to_string(), "Spirit".to_string()]
}
