//! Storage gateway for the kudos ledger.
//!
//! The engines talk to durable storage through two traits: [`Store`] for
//! pool-scoped reads and administrative writes, and [`StoreTx`] for the
//! atomic read-check-write-record sequences that every balance- or
//! stock-affecting operation must run inside. Two backends are provided:
//!
//! - [`MemoryStore`] — serialized in-memory transactions, for tests and
//!   small single-process deployments;
//! - [`SqlStore`] — PostgreSQL, MySQL, or SQLite through SQLx.
//!
//! # Example
//!
//! ```ignore
//! use kudos_store::{SqlStore, SqlStoreConfig};
//!
//! let store = SqlStore::connect(SqlStoreConfig::new("sqlite:kudos.db")).await?;
//! store.init_schema().await?;
//! ```

mod error;
mod memory;
mod traits;

pub mod cli;
pub mod sql;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sql::{DatabaseType, SqlStore, SqlStoreConfig};
pub use traits::{Store, StoreTx};
