use super::types::{Config, SearcherBackend};
use super::ConfigError;

fn is_iata_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// Validate configuration semantics that serde cannot enforce.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let search = &config.search;

    if !is_iata_code(&search.origin) {
        return Err(ConfigError::ValidationError(format!(
            "search.origin must be a 3-letter IATA code, got {:?}",
            search.origin
        )));
    }

    if search.destinations.is_empty() {
        return Err(ConfigError::ValidationError(
            "search.destinations cannot be empty".to_string(),
        ));
    }

    for code in search.destinations.keys() {
        if !is_iata_code(code) {
            return Err(ConfigError::ValidationError(format!(
                "destination {:?} is not a 3-letter IATA code",
                code
            )));
        }
    }

    if search.trip_lengths.is_empty() {
        return Err(ConfigError::ValidationError(
            "search.trip_lengths cannot be empty".to_string(),
        ));
    }

    if search.trip_lengths.iter().any(|&len| len == 0) {
        return Err(ConfigError::ValidationError(
            "search.trip_lengths must be positive".to_string(),
        ));
    }

    if search.max_duration_hrs <= 0.0 {
        return Err(ConfigError::ValidationError(
            "search.max_duration_hrs must be positive".to_string(),
        ));
    }

    let orch = &config.orchestrator;

    if orch.max_workers == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.max_workers must be at least 1".to_string(),
        ));
    }

    if orch.flush_every == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.flush_every must be at least 1".to_string(),
        ));
    }

    if orch.sleep_min_ms > orch.sleep_max_ms {
        return Err(ConfigError::ValidationError(
            "orchestrator.sleep_min_ms cannot exceed sleep_max_ms".to_string(),
        ));
    }

    match config.searcher.backend {
        SearcherBackend::FlightsApi => {
            if config.searcher.flights_api.is_none() {
                return Err(ConfigError::ValidationError(
                    "searcher.flights_api section required for backend = \"flights_api\""
                        .to_string(),
                ));
            }
        }
        SearcherBackend::PageExtract => {
            if config.searcher.page_extract.is_none() {
                return Err(ConfigError::ValidationError(
                    "searcher.page_extract section required for backend = \"page_extract\""
                        .to_string(),
                ));
            }
            if config.extractor.is_none() {
                return Err(ConfigError::ValidationError(
                    "extractor section required for backend = \"page_extract\"".to_string(),
                ));
            }
        }
    }

    Ok(())
}
