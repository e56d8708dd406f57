//! Types for the flight search system.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalizer::RawOffer;

/// Parameters for one one-way leg search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Departure airport IATA code.
    pub origin: String,
    /// Arrival airport IATA code.
    pub destination: String,
    pub date: NaiveDate,
    pub adults: u32,
    /// Maximum stops to request, if the backend supports filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stops: Option<u32>,
}

/// Errors that can occur during a search attempt.
///
/// An empty offer list is NOT an error; backends return `Ok(vec![])` for
/// ordinary "no results". The orchestrator treats both errors and empty
/// results as retryable.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Search backend API error: {0}")]
    ApiError(String),

    #[error("Search request timed out")]
    Timeout,

    #[error("Result page fetch failed: {0}")]
    PageFetch(String),
}

/// Trait for flight search backends.
#[async_trait]
pub trait LegSearcher: Send + Sync {
    /// Search one-way offers for a leg. Returns an empty Vec for ordinary
    /// "no results"; errors are transport or API failures.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawOffer>, SearchError>;

    /// Backend name for logging.
    fn backend_name(&self) -> &str;
}
