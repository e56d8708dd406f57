//! Flight search abstraction.
//!
//! This module provides a `LegSearcher` trait for one-way leg searches
//! across backends: a structured flights API wrapper, or a raw results page
//! run through the LLM extractor.

mod flights_api;
mod page_extract;
mod types;

pub use flights_api::FlightsApiSearcher;
pub use page_extract::PageExtractSearcher;
pub use types::{LegSearcher, SearchError, SearchRequest};
