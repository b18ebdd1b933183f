//! Configuration file loading and error types.

use std::{fs, path::Path};

use crate::Config;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported config format")]
    UnsupportedFormat,
    #[error("validation: {0}")]
    Validation(String),
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)?;
    match path.extension().and_then(|s| s.to_str()).unwrap_or("") {
        "json" | "jsonc" => {
            let stripped = json_comments::StripComments::new(data.as_bytes());
            Ok(serde_json::from_reader(stripped)?)
        }
        "yaml" | "yml" => Ok(serde_yaml::from_str(&data)?),
        "toml" => Ok(toml::from_str(&data)?),
        _ => Err(ConfigError::UnsupportedFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_applies_defaults() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            database_url = "sqlite:kudos.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.database_url, "sqlite:kudos.db");
        assert_eq!(config.storage.max_connections, 10);
        assert!(config.allocation.enabled);
        assert_eq!(config.allocation.period_secs, 30 * 24 * 60 * 60);
        assert_eq!(config.logging.level, "info");
        assert!(config.metrics.listen.is_none());
    }

    #[test]
    fn test_json_with_comments() {
        let data = r#"
        {
            // storage section
            "storage": { "database_url": "postgres://localhost/kudos" },
            "allocation": { "enabled": false, "period_secs": 86400 }
        }
        "#;
        let stripped = json_comments::StripComments::new(data.as_bytes());
        let config: Config = serde_json::from_reader(stripped).unwrap();

        assert!(!config.allocation.enabled);
        assert_eq!(config.allocation.period_secs, 86400);
    }
}
