//! Entity records and engine result types.
//!
//! Records are plain data returned by the storage gateway; all ids are
//! opaque strings and timestamps are unix seconds. Validation lives in the
//! engine crates, not here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Credit from a transfer or refund.
    Earned,
    /// Debit from a transfer or redemption.
    Spent,
    /// Credit from the monthly allowance job.
    Allocated,
}

impl TransactionType {
    /// Stable string form used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Earned => "EARNED",
            TransactionType::Spent => "SPENT",
            TransactionType::Allocated => "ALLOCATED",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EARNED" => Ok(TransactionType::Earned),
            "SPENT" => Ok(TransactionType::Spent),
            "ALLOCATED" => Ok(TransactionType::Allocated),
            other => Err(format!("unknown transaction type: {other}")),
        }
    }
}

/// Lifecycle state of a reward redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedemptionStatus {
    Pending,
    Approved,
    Fulfilled,
    Cancelled,
}

impl RedemptionStatus {
    /// Stable string form used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            RedemptionStatus::Pending => "PENDING",
            RedemptionStatus::Approved => "APPROVED",
            RedemptionStatus::Fulfilled => "FULFILLED",
            RedemptionStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedemptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RedemptionStatus::Pending),
            "APPROVED" => Ok(RedemptionStatus::Approved),
            "FULFILLED" => Ok(RedemptionStatus::Fulfilled),
            "CANCELLED" => Ok(RedemptionStatus::Cancelled),
            other => Err(format!("unknown redemption status: {other}")),
        }
    }
}

/// Organizational role. The engines are role-agnostic; the field exists so
/// the calling layer can make policy decisions without a second lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    Employee,
    Manager,
    Admin,
}

impl Role {
    /// Stable string form used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Employee => "EMPLOYEE",
            Role::Manager => "MANAGER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMPLOYEE" => Ok(Role::Employee),
            "MANAGER" => Ok(Role::Manager),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A user account. `points_balance` is mutated exclusively by ledger
/// operations inside a storage transaction; accounts are soft-disabled via
/// `is_active` and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub role: Role,
    pub points_balance: i64,
    pub monthly_allocation: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserRecord {
    /// Human-readable name embedded in counterparty transaction
    /// descriptions.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Input for user registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub role: Role,
    pub points_balance: i64,
    pub monthly_allocation: i64,
}

/// An immutable, append-only ledger entry. `amount` is signed: positive for
/// credits, negative for debits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    pub user_id: String,
    pub kind: TransactionType,
    pub amount: i64,
    pub description: String,
    /// Optional link to the recognition or redemption that caused the entry.
    pub related_id: Option<String>,
    pub created_at: i64,
}

/// Input for a ledger entry.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: String,
    pub kind: TransactionType,
    pub amount: i64,
    pub description: String,
    pub related_id: Option<String>,
}

/// A peer-to-peer recognition carrying a point transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionRecord {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub message: String,
    pub points_amount: i64,
    pub is_private: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for a recognition row.
#[derive(Debug, Clone)]
pub struct NewRecognition {
    pub sender_id: String,
    pub recipient_id: String,
    pub message: String,
    pub points_amount: i64,
    pub is_private: bool,
}

/// A catalog reward. `stock_quantity` of `None` means unlimited; limited
/// stock is decremented and restored only by the redemption engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub points_cost: i64,
    pub category: String,
    pub is_active: bool,
    pub stock_quantity: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for creating a reward.
#[derive(Debug, Clone)]
pub struct NewReward {
    pub title: String,
    pub description: String,
    pub points_cost: i64,
    pub category: String,
    pub stock_quantity: Option<i64>,
}

/// Partial update for a reward. `stock_quantity` is doubly optional so a
/// patch can distinguish "leave as is" from "set to unlimited".
#[derive(Debug, Clone, Default)]
pub struct RewardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub points_cost: Option<i64>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub stock_quantity: Option<Option<i64>>,
}

/// A redemption of points against a reward. `points_spent` snapshots the
/// cost at redemption time; later price changes never affect refunds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionRecord {
    pub id: String,
    pub user_id: String,
    pub reward_id: String,
    pub points_spent: i64,
    pub status: RedemptionStatus,
    pub redemption_code: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for a redemption row; status starts at PENDING.
#[derive(Debug, Clone)]
pub struct NewRedemption {
    pub user_id: String,
    pub reward_id: String,
    pub points_spent: i64,
    pub redemption_code: String,
}

/// A redemption joined with its user and reward.
#[derive(Debug, Clone, Serialize)]
pub struct RedemptionDetail {
    pub redemption: RedemptionRecord,
    pub user: UserRecord,
    pub reward: RewardRecord,
}

/// Balance view returned by `Ledger::balance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceView {
    pub points_balance: i64,
    pub monthly_allocation: i64,
}

/// Result of a single credit or debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerOutcome {
    pub new_balance: i64,
    pub amount: i64,
}

/// Result of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    pub sender_new_balance: i64,
    pub recipient_new_balance: i64,
    pub amount: i64,
}

/// Selector for recognition listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionFilter {
    /// Public recognitions only (the feed).
    Public,
    /// Recognitions sent by the given user.
    Sent(String),
    /// Recognitions received by the given user.
    Received(String),
    /// Recognitions the given user sent or received.
    Involving(String),
}

/// One page of recognitions, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionPage {
    pub recognitions: Vec<RecognitionRecord>,
    pub total_count: i64,
    pub has_more: bool,
}

/// Per-kind ledger aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeTotals {
    pub kind: TransactionType,
    pub count: i64,
    pub total: i64,
}

/// System-wide ledger aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStats {
    /// Sum of all active users' balances.
    pub total_points_in_system: i64,
    pub total_transactions: i64,
    pub by_kind: Vec<TypeTotals>,
}

/// Catalog and redemption aggregates.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RewardStats {
    pub total_rewards: i64,
    pub active_rewards: i64,
    pub total_redemptions: i64,
    pub pending_redemptions: i64,
}

/// Outcome of one monthly allocation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AllocationReport {
    /// Users credited their allowance.
    pub credited: usize,
    /// Users skipped after a per-user failure.
    pub failed: usize,
    /// Total points granted across the run.
    pub points_granted: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_round_trip() {
        for kind in [
            TransactionType::Earned,
            TransactionType::Spent,
            TransactionType::Allocated,
        ] {
            assert_eq!(kind.as_str().parse::<TransactionType>().unwrap(), kind);
        }
        assert!("BORROWED".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_redemption_status_round_trip() {
        for status in [
            RedemptionStatus::Pending,
            RedemptionStatus::Approved,
            RedemptionStatus::Fulfilled,
            RedemptionStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<RedemptionStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_serde_uses_storage_names() {
        let json = serde_json::to_string(&TransactionType::Allocated).unwrap();
        assert_eq!(json, "\"ALLOCATED\"");
        let status: RedemptionStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(status, RedemptionStatus::Cancelled);
    }

    #[test]
    fn test_display_name() {
        let user = UserRecord {
            id: "u1".into(),
            email: "ada@example.com".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            department: "Engineering".into(),
            role: Role::Employee,
            points_balance: 0,
            monthly_allocation: 0,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(user.display_name(), "Ada Lovelace");
    }
}
