use std::collections::HashSet;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Search page and catalog timeout are non-zero
/// - Source names are non-empty and unique
///
/// Source URLs are passed through untouched.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.search.page == 0 {
        return Err(ConfigError::ValidationError(
            "search.page must be at least 1".to_string(),
        ));
    }

    if config.catalog.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.timeout_secs cannot be 0".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for source in &config.sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "sources[].name cannot be empty".to_string(),
            ));
        }
        if !seen.insert(source.name.trim()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate source name: {}",
                source.name
            )));
        }
    }

    Ok(())
}
