//! Configuration validation logic.

use crate::loader::ConfigError;
use crate::Config;

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.storage.database_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "storage.database_url is empty".into(),
        ));
    }
    if config.storage.max_connections == 0 {
        return Err(ConfigError::Validation(
            "storage.max_connections must be > 0".into(),
        ));
    }
    if config.storage.min_connections > config.storage.max_connections {
        return Err(ConfigError::Validation(
            "storage.min_connections must not exceed max_connections".into(),
        ));
    }
    if config.storage.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "storage.connect_timeout_secs must be > 0".into(),
        ));
    }
    if config.allocation.period_secs == 0 {
        return Err(ConfigError::Validation(
            "allocation.period_secs must be > 0".into(),
        ));
    }
    if !matches!(config.logging.format.as_str(), "text" | "json") {
        return Err(ConfigError::Validation(format!(
            "logging.format must be 'text' or 'json', got '{}'",
            config.logging.format
        )));
    }
    Ok(())
}
