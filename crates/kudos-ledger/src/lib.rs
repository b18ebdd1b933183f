//! Points ledger engine.
//!
//! [`Ledger`] exposes balance reads, credits, debits, and atomic transfers
//! over a [`Store`](kudos_store::Store). Every mutation runs inside one
//! storage transaction that re-reads the authoritative balance, validates
//! against the fresh value, writes the new balance, and appends an immutable
//! [`TransactionRecord`](kudos_core::TransactionRecord) — so concurrent
//! operations against the same user can never overdraw an account or lose an
//! update.
//!
//! The transaction-scoped primitives in [`ops`] are shared with the
//! redemption and recognition engines so their ledger side effects join the
//! caller's transaction.

mod allocation;
mod engine;
mod scheduler;

pub mod cli;
pub mod ops;

pub use allocation::run_monthly_allocation;
pub use engine::Ledger;
pub use scheduler::spawn_allocation_scheduler;
