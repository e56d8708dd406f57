//! Flights API wrapper backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::FlightsApiConfig;
use crate::normalizer::RawOffer;

use super::types::{LegSearcher, SearchError, SearchRequest};

/// Search backend talking to a structured flights API wrapper over HTTP.
pub struct FlightsApiSearcher {
    client: Client,
    config: FlightsApiConfig,
}

impl FlightsApiSearcher {
    /// Create a new searcher with the given configuration.
    pub fn new(config: FlightsApiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    fn build_search_url(&self, request: &SearchRequest) -> String {
        let mut url = format!(
            "{}/search?origin={}&destination={}&date={}&adults={}",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(&request.origin),
            urlencoding::encode(&request.destination),
            request.date,
            request.adults,
        );
        if let Some(max_stops) = request.max_stops {
            url.push_str(&format!("&max_stops={}", max_stops));
        }
        url
    }
}

/// Wire shape of the wrapper's search response.
#[derive(Debug, Deserialize)]
struct FlightsApiResponse {
    #[serde(default)]
    flights: Vec<RawOffer>,
}

#[async_trait]
impl LegSearcher for FlightsApiSearcher {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawOffer>, SearchError> {
        let url = self.build_search_url(request);
        debug!(
            origin = %request.origin,
            destination = %request.destination,
            date = %request.date,
            "Searching flights API"
        );

        let mut http_request = self.client.get(&url);
        if let Some(api_key) = &self.config.api_key {
            http_request = http_request.header("X-Api-Key", api_key);
        }

        let response = http_request.send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout
            } else if e.is_connect() {
                SearchError::ConnectionFailed(e.to_string())
            } else {
                SearchError::ApiError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: FlightsApiResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ApiError(format!("Failed to parse response: {}", e)))?;

        debug!(
            offers = parsed.flights.len(),
            origin = %request.origin,
            destination = %request.destination,
            "Flights API search complete"
        );

        Ok(parsed.flights)
    }

    fn backend_name(&self) -> &str {
        "flights_api"
    }
}
