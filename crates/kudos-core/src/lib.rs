//! Core domain types for the kudos points ledger.
//!
//! This crate defines the entity records, the transaction and redemption
//! vocabulary, and the error taxonomy shared by every engine crate. It holds
//! no behavior beyond construction helpers — balance and stock mutation live
//! in `kudos-ledger` and `kudos-rewards`, and persistence lives behind the
//! `kudos-store` gateway.

mod error;
mod id;
mod types;

pub mod defaults;

pub use error::{Error, ErrorKind, Result};
pub use id::{new_id, now_unix, redemption_code};
pub use types::{
    AllocationReport, BalanceView, LedgerOutcome, LedgerStats, NewRecognition, NewRedemption,
    NewReward, NewTransaction, NewUser, RecognitionFilter, RecognitionPage, RecognitionRecord,
    RedemptionDetail, RedemptionRecord, RedemptionStatus, RewardPatch, RewardRecord, RewardStats,
    Role, TransactionRecord, TransactionType, TransferOutcome, TypeTotals, UserRecord,
};
