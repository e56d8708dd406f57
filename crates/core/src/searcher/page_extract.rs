//! Raw-page search backend: fetch the booking results page over HTTP and
//! hand the markup to the LLM extractor.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::{ExtractorConfig, PageExtractConfig};
use crate::extractor::{extract_offers, LlmClient};
use crate::normalizer::RawOffer;

use super::types::{LegSearcher, SearchError, SearchRequest};

/// Search backend that scrapes a results page and extracts offers via LLM.
pub struct PageExtractSearcher {
    client: Client,
    config: PageExtractConfig,
    extractor_config: ExtractorConfig,
    llm: Arc<dyn LlmClient>,
}

impl PageExtractSearcher {
    pub fn new(
        config: PageExtractConfig,
        extractor_config: ExtractorConfig,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            extractor_config,
            llm,
        }
    }

    /// Build the booking-search URL for one leg, with the slice payload
    /// encoded the way the booking site's own search form does it.
    fn build_page_url(&self, request: &SearchRequest) -> String {
        let slices = serde_json::json!([{
            "orig": request.origin,
            "dest": request.destination,
            "date": request.date.to_string(),
        }])
        .to_string();

        format!(
            "{}?type=OneWay&adult={}&slices={}",
            self.config.search_url.trim_end_matches('/'),
            request.adults,
            urlencoding::encode(&slices),
        )
    }
}

#[async_trait]
impl LegSearcher for PageExtractSearcher {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawOffer>, SearchError> {
        let url = self.build_page_url(request);
        debug!(
            origin = %request.origin,
            destination = %request.destination,
            date = %request.date,
            "Fetching results page"
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout
            } else {
                SearchError::PageFetch(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(SearchError::PageFetch(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::PageFetch(e.to_string()))?;

        // Malformed or refused extraction is an ordinary empty result, not
        // an error; the retry logic upstream decides whether to try again.
        let offers = extract_offers(self.llm.as_ref(), &html, &self.extractor_config).await;
        debug!(offers = offers.len(), "Page extraction complete");
        Ok(offers)
    }

    fn backend_name(&self) -> &str {
        "page_extract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{CompletionRequest, LlmError};

    struct StaticLlm;

    #[async_trait]
    impl LlmClient for StaticLlm {
        fn provider(&self) -> &str {
            "static"
        }

        fn model(&self) -> &str {
            "static"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<String, LlmError> {
            Ok("[]".to_string())
        }
    }

    #[test]
    fn page_url_encodes_slices_json() {
        let searcher = PageExtractSearcher::new(
            PageExtractConfig {
                search_url: "https://example.com/booking/search".to_string(),
                timeout_secs: 30,
            },
            ExtractorConfig {
                api_key: "k".to_string(),
                model: "m".to_string(),
                api_base: None,
                max_content_chars: 1000,
            },
            Arc::new(StaticLlm),
        );

        let url = searcher.build_page_url(&SearchRequest {
            origin: "BOS".to_string(),
            destination: "CUN".to_string(),
            date: "2026-05-01".parse().unwrap(),
            adults: 2,
            max_stops: None,
        });

        assert!(url.starts_with("https://example.com/booking/search?type=OneWay&adult=2&slices="));
        assert!(url.contains("%22orig%22%3A%22BOS%22"));
        assert!(url.contains("2026-05-01"));
    }
}
