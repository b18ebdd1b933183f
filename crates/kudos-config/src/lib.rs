//! Configuration loading and validation.
//!
//! Supports JSON (with comments), YAML, and TOML config files, selected by
//! file extension. Every field beyond the database URL has a serde default,
//! so a minimal config is just:
//!
//! ```toml
//! [storage]
//! database_url = "sqlite:kudos.db"
//! ```

mod defaults;
mod loader;
mod types;
mod validate;

pub use loader::{load_config, ConfigError};
pub use types::{AllocationConfig, Config, LoggingConfig, MetricsConfig, StorageConfig};
pub use validate::validate_config;
