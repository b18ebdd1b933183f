//! Gateway traits: pool-scoped [`Store`] and transaction-scoped [`StoreTx`].

use std::sync::Arc;

use async_trait::async_trait;

use kudos_core::{
    LedgerStats, NewRecognition, NewRedemption, NewReward, NewTransaction, NewUser,
    RecognitionFilter, RecognitionRecord, RedemptionRecord, RedemptionStatus, RewardPatch,
    RewardRecord, RewardStats, TransactionRecord, UserRecord,
};

use crate::error::StoreResult;

/// Durable storage gateway.
///
/// Implementations must be thread-safe (`Send + Sync`) as they are shared
/// across concurrently executing operations. Lookups return `Ok(None)` for
/// missing rows — mapping absence to an error is the engines' job, as is
/// every `is_active` check.
#[async_trait]
pub trait Store: Send + Sync {
    /// Open an atomic transaction scope.
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;

    // --- users ---

    /// Look up a user by id, active or not.
    async fn user(&self, id: &str) -> StoreResult<Option<UserRecord>>;

    /// Look up a user by email, active or not.
    async fn user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// All active users, oldest registration first.
    async fn list_active_users(&self) -> StoreResult<Vec<UserRecord>>;

    /// Register a user. Fails with [`StoreError::Duplicate`] on a taken
    /// email.
    ///
    /// [`StoreError::Duplicate`]: crate::StoreError::Duplicate
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord>;

    /// Soft-enable or soft-disable an account.
    async fn set_user_active(&self, id: &str, active: bool) -> StoreResult<bool>;

    /// Overwrite a user's monthly allowance.
    async fn set_user_allocation(&self, id: &str, allocation: i64) -> StoreResult<bool>;

    // --- ledger ---

    /// Most recent ledger entries for a user, newest first.
    async fn transactions_for_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> StoreResult<Vec<TransactionRecord>>;

    /// System-wide ledger aggregates.
    async fn ledger_stats(&self) -> StoreResult<LedgerStats>;

    // --- rewards ---

    /// Look up a reward by id.
    async fn reward(&self, id: &str) -> StoreResult<Option<RewardRecord>>;

    /// List rewards, ordered by category then cost.
    async fn list_rewards(&self, active_only: bool) -> StoreResult<Vec<RewardRecord>>;

    /// Create a reward.
    async fn insert_reward(&self, reward: NewReward) -> StoreResult<RewardRecord>;

    /// Apply a partial update; `Ok(None)` when the reward does not exist.
    async fn update_reward(
        &self,
        id: &str,
        patch: RewardPatch,
    ) -> StoreResult<Option<RewardRecord>>;

    /// Catalog and redemption aggregates.
    async fn reward_stats(&self) -> StoreResult<RewardStats>;

    // --- redemptions ---

    /// Look up a redemption by id.
    async fn redemption(&self, id: &str) -> StoreResult<Option<RedemptionRecord>>;

    /// A user's redemptions, newest first.
    async fn redemptions_for_user(&self, user_id: &str) -> StoreResult<Vec<RedemptionRecord>>;

    /// All redemptions, newest first.
    async fn list_redemptions(&self) -> StoreResult<Vec<RedemptionRecord>>;

    // --- recognitions ---

    /// Look up a recognition by id.
    async fn recognition(&self, id: &str) -> StoreResult<Option<RecognitionRecord>>;

    /// Page through recognitions matching the filter, newest first.
    async fn list_recognitions(
        &self,
        filter: &RecognitionFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<RecognitionRecord>>;

    /// Total recognitions matching the filter.
    async fn count_recognitions(&self, filter: &RecognitionFilter) -> StoreResult<i64>;

    /// Flip a recognition's privacy flag.
    async fn set_recognition_privacy(&self, id: &str, is_private: bool) -> StoreResult<bool>;
}

/// One atomic transaction scope.
///
/// All reads observe a point-in-time consistent snapshot and, where the
/// backend supports it, `*_for_update` reads take row locks so concurrent
/// mutators of the same user balance or reward stock serialize. Dropping a
/// transaction without calling [`commit`](StoreTx::commit) rolls it back.
#[async_trait]
pub trait StoreTx: Send {
    /// Locked read of a user row.
    async fn user_for_update(&mut self, id: &str) -> StoreResult<Option<UserRecord>>;

    /// Overwrite a user's balance. Must be paired with
    /// [`insert_transaction`](StoreTx::insert_transaction) before commit.
    async fn set_user_balance(&mut self, id: &str, balance: i64) -> StoreResult<()>;

    /// Append one immutable ledger entry.
    async fn insert_transaction(&mut self, tx: NewTransaction) -> StoreResult<TransactionRecord>;

    /// Locked read of a reward row.
    async fn reward_for_update(&mut self, id: &str) -> StoreResult<Option<RewardRecord>>;

    /// Overwrite a reward's remaining stock.
    async fn set_reward_stock(&mut self, id: &str, stock: i64) -> StoreResult<()>;

    /// Delete a reward row.
    async fn delete_reward(&mut self, id: &str) -> StoreResult<()>;

    /// Number of PENDING redemptions referencing the reward.
    async fn count_pending_redemptions(&mut self, reward_id: &str) -> StoreResult<i64>;

    /// Create a redemption row with status PENDING.
    async fn insert_redemption(&mut self, r: NewRedemption) -> StoreResult<RedemptionRecord>;

    /// Locked read of a redemption row.
    async fn redemption_for_update(&mut self, id: &str) -> StoreResult<Option<RedemptionRecord>>;

    /// Overwrite a redemption's status.
    async fn set_redemption_status(
        &mut self,
        id: &str,
        status: RedemptionStatus,
    ) -> StoreResult<()>;

    /// Create a recognition row.
    async fn insert_recognition(&mut self, r: NewRecognition) -> StoreResult<RecognitionRecord>;

    /// Locked read of a recognition row.
    async fn recognition_for_update(&mut self, id: &str)
        -> StoreResult<Option<RecognitionRecord>>;

    /// Delete a recognition row.
    async fn delete_recognition(&mut self, id: &str) -> StoreResult<()>;

    /// Commit all writes.
    async fn commit(self: Box<Self>) -> StoreResult<()>;

    /// Discard all writes. Equivalent to dropping the transaction, but
    /// surfaces backend errors.
    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// Blanket implementation for `Arc<S>` so engines can share one store.
#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        (**self).begin().await
    }

    async fn user(&self, id: &str) -> StoreResult<Option<UserRecord>> {
        (**self).user(id).await
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        (**self).user_by_email(email).await
    }

    async fn list_active_users(&self) -> StoreResult<Vec<UserRecord>> {
        (**self).list_active_users().await
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        (**self).insert_user(user).await
    }

    async fn set_user_active(&self, id: &str, active: bool) -> StoreResult<bool> {
        (**self).set_user_active(id, active).await
    }

    async fn set_user_allocation(&self, id: &str, allocation: i64) -> StoreResult<bool> {
        (**self).set_user_allocation(id, allocation).await
    }

    async fn transactions_for_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> StoreResult<Vec<TransactionRecord>> {
        (**self).transactions_for_user(user_id, limit).await
    }

    async fn ledger_stats(&self) -> StoreResult<LedgerStats> {
        (**self).ledger_stats().await
    }

    async fn reward(&self, id: &str) -> StoreResult<Option<RewardRecord>> {
        (**self).reward(id).await
    }

    async fn list_rewards(&self, active_only: bool) -> StoreResult<Vec<RewardRecord>> {
        (**self).list_rewards(active_only).await
    }

    async fn insert_reward(&self, reward: NewReward) -> StoreResult<RewardRecord> {
        (**self).insert_reward(reward).await
    }

    async fn update_reward(
        &self,
        id: &str,
        patch: RewardPatch,
    ) -> StoreResult<Option<RewardRecord>> {
        (**self).update_reward(id, patch).await
    }

    async fn reward_stats(&self) -> StoreResult<RewardStats> {
        (**self).reward_stats().await
    }

    async fn redemption(&self, id: &str) -> StoreResult<Option<RedemptionRecord>> {
        (**self).redemption(id).await
    }

    async fn redemptions_for_user(&self, user_id: &str) -> StoreResult<Vec<RedemptionRecord>> {
        (**self).redemptions_for_user(user_id).await
    }

    async fn list_redemptions(&self) -> StoreResult<Vec<RedemptionRecord>> {
        (**self).list_redemptions().await
    }

    async fn recognition(&self, id: &str) -> StoreResult<Option<RecognitionRecord>> {
        (**self).recognition(id).await
    }

    async fn list_recognitions(
        &self,
        filter: &RecognitionFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<RecognitionRecord>> {
        (**self).list_recognitions(filter, limit, offset).await
    }

    async fn count_recognitions(&self, filter: &RecognitionFilter) -> StoreResult<i64> {
        (**self).count_recognitions(filter).await
    }

    async fn set_recognition_privacy(&self, id: &str, is_private: bool) -> StoreResult<bool> {
        (**self).set_recognition_privacy(id, is_private).await
    }
}
