//! # kudos-rs
//!
//! A peer-recognition points ledger and rewards engine.
//!
//! Employees send point-backed recognitions to colleagues, accumulate
//! points, and redeem them against a reward catalog. Every balance- or
//! stock-affecting operation runs inside a single storage transaction, so
//! conservation and non-negativity hold under concurrent requests.
//!
//! ## Crates
//!
//! - [`kudos_core`] - Shared domain types and the error taxonomy
//! - [`kudos_store`] - Storage gateway (in-memory and SQL backends)
//! - [`kudos_ledger`] - Ledger engine and the monthly allocation job
//! - [`kudos_rewards`] - Reward catalog and redemption engine
//! - [`kudos_recognition`] - Peer recognition workflow
//! - [`kudos_config`] - Configuration loading and validation
//! - [`kudos_metrics`] - Metric names and Prometheus bootstrap

pub use kudos_config;
pub use kudos_core;
pub use kudos_ledger;
pub use kudos_metrics;
pub use kudos_recognition;
pub use kudos_rewards;
pub use kudos_store;
