//! Reward catalog and redemption engine.
//!
//! [`Rewards`] couples stock movements to ledger debits and credits: a
//! redemption debits the user, decrements limited stock, and creates a
//! PENDING redemption row in one storage transaction; cancelling a PENDING
//! redemption refunds the snapshot price and restores stock the same way.

mod engine;

pub mod cli;

pub use engine::Rewards;
