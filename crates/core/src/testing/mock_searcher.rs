//! Mock leg searcher for testing.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::normalizer::RawOffer;
use crate::searcher::{LegSearcher, SearchError, SearchRequest};

/// Route identity used to script per-route behavior.
type RouteKey = (String, String, NaiveDate);

/// A recorded search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
}

/// Mock implementation of the `LegSearcher` trait.
///
/// Provides controllable behavior for testing:
/// - Script offers per (origin, destination, date) route or globally
/// - Fail the first N attempts of a route to exercise retries
/// - Track every search made for assertions
pub struct MockLegSearcher {
    default_offers: Arc<RwLock<Vec<RawOffer>>>,
    route_offers: Arc<RwLock<HashMap<RouteKey, Vec<RawOffer>>>>,
    failures_remaining: Arc<RwLock<HashMap<RouteKey, u32>>>,
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
}

impl MockLegSearcher {
    pub fn new() -> Self {
        Self {
            default_offers: Arc::new(RwLock::new(Vec::new())),
            route_offers: Arc::new(RwLock::new(HashMap::new())),
            failures_remaining: Arc::new(RwLock::new(HashMap::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Offers returned for any route without scripted behavior.
    pub async fn set_default_offers(&self, offers: Vec<RawOffer>) {
        *self.default_offers.write().await = offers;
    }

    /// Offers returned for one specific route.
    pub async fn set_route_offers(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        offers: Vec<RawOffer>,
    ) {
        self.route_offers.write().await.insert(
            (origin.to_string(), destination.to_string(), date),
            offers,
        );
    }

    /// Make the next `n` searches of a route fail with a connection error.
    pub async fn fail_next(&self, origin: &str, destination: &str, date: NaiveDate, n: u32) {
        self.failures_remaining
            .write()
            .await
            .insert((origin.to_string(), destination.to_string(), date), n);
    }

    /// Every search made so far, in call order.
    pub async fn recorded_searches(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }

    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }
}

impl Default for MockLegSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LegSearcher for MockLegSearcher {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawOffer>, SearchError> {
        let key = (
            request.origin.clone(),
            request.destination.clone(),
            request.date,
        );

        self.searches.write().await.push(RecordedSearch {
            origin: request.origin.clone(),
            destination: request.destination.clone(),
            date: request.date,
        });

        {
            let mut failures = self.failures_remaining.write().await;
            if let Some(remaining) = failures.get_mut(&key) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(SearchError::ConnectionFailed(
                        "mock failure scripted".to_string(),
                    ));
                }
            }
        }

        if let Some(offers) = self.route_offers.read().await.get(&key) {
            return Ok(offers.clone());
        }

        Ok(self.default_offers.read().await.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}
