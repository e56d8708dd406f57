use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("FAREHOUND_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlanMode, SearcherBackend};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[search]
origin = "BOS"

[search.destinations]
CUN = "Cancun"
PUJ = "Punta Cana"

[searcher]
backend = "flights_api"

[searcher.flights_api]
url = "http://localhost:8933"
"#;

    #[test]
    fn test_load_config_from_str_valid() {
        let config = load_config_from_str(MINIMAL).unwrap();
        assert_eq!(config.search.origin, "BOS");
        assert_eq!(config.search.adults, 2);
        assert_eq!(config.search.trip_lengths, vec![3, 4, 5, 6]);
        assert_eq!(config.search.plan_mode, PlanMode::PerDirection);
        assert_eq!(config.searcher.backend, SearcherBackend::FlightsApi);
        assert_eq!(config.orchestrator.max_workers, 3);
        assert_eq!(config.orchestrator.flush_every, 20);
        assert_eq!(config.report.top_n, 5);
    }

    #[test]
    fn test_load_config_from_str_missing_search() {
        let toml = r#"
[searcher]
backend = "flights_api"
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", MINIMAL).unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.search.destinations.len(), 2);
        assert_eq!(config.search.destinations["CUN"], "Cancun");
    }
}
