//! Configuration type definitions for storage, allocation, metrics, and
//! logging.

use serde::{Deserialize, Serialize};

use crate::defaults::*;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database connection URL (postgres, mysql, or sqlite).
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_max_lifetime_secs")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

/// Monthly allocation job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// Whether the recurring scheduler is enabled; the on-demand trigger
    /// works regardless.
    #[serde(default = "default_allocation_enabled")]
    pub enabled: bool,
    /// Interval between allocation runs.
    #[serde(default = "default_allocation_period_secs")]
    pub period_secs: u64,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            enabled: default_allocation_enabled(),
            period_secs: default_allocation_period_secs(),
        }
    }
}

/// Prometheus exporter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Listen address for the metrics endpoint (e.g. `127.0.0.1:9091`).
    /// Disabled when absent.
    #[serde(default)]
    pub listen: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level filter (`RUST_LOG` overrides it).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: `text` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
