//! In-memory storage backend.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use kudos_core::{
    new_id, now_unix, LedgerStats, NewRecognition, NewRedemption, NewReward, NewTransaction,
    NewUser, RecognitionFilter, RecognitionRecord, RedemptionRecord, RedemptionStatus,
    RewardPatch, RewardRecord, RewardStats, TransactionRecord, TransactionType, TypeTotals,
    UserRecord,
};

use crate::error::{StoreError, StoreResult};
use crate::traits::{Store, StoreTx};

/// In-memory storage backend.
///
/// Transactions take the single store lock for their whole lifetime and
/// mutate a shadow copy that is written back on commit, so isolation is
/// fully serialized. This is suitable for tests and small single-process
/// deployments; production setups should use [`SqlStore`](crate::SqlStore).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default)]
struct Inner {
    users: Vec<UserRecord>,
    transactions: Vec<TransactionRecord>,
    rewards: Vec<RewardRecord>,
    redemptions: Vec<RedemptionRecord>,
    recognitions: Vec<RecognitionRecord>,
}

fn matches(filter: &RecognitionFilter, rec: &RecognitionRecord) -> bool {
    match filter {
        RecognitionFilter::Public => !rec.is_private,
        RecognitionFilter::Sent(user) => rec.sender_id == *user,
        RecognitionFilter::Received(user) => rec.recipient_id == *user,
        RecognitionFilter::Involving(user) => {
            rec.sender_id == *user || rec.recipient_id == *user
        }
    }
}

impl Inner {
    fn user(&self, id: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == id)
    }

    fn user_mut(&mut self, id: &str) -> Option<&mut UserRecord> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    fn reward(&self, id: &str) -> Option<&RewardRecord> {
        self.rewards.iter().find(|r| r.id == id)
    }

    fn reward_mut(&mut self, id: &str) -> Option<&mut RewardRecord> {
        self.rewards.iter_mut().find(|r| r.id == id)
    }

    fn redemption(&self, id: &str) -> Option<&RedemptionRecord> {
        self.redemptions.iter().find(|r| r.id == id)
    }

    fn recognition(&self, id: &str) -> Option<&RecognitionRecord> {
        self.recognitions.iter().find(|r| r.id == id)
    }

    fn insert_user(&mut self, user: NewUser) -> StoreResult<UserRecord> {
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }
        let now = now_unix();
        let record = UserRecord {
            id: new_id(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            department: user.department,
            role: user.role,
            points_balance: user.points_balance,
            monthly_allocation: user.monthly_allocation,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.users.push(record.clone());
        Ok(record)
    }

    fn insert_transaction(&mut self, tx: NewTransaction) -> TransactionRecord {
        let record = TransactionRecord {
            id: new_id(),
            user_id: tx.user_id,
            kind: tx.kind,
            amount: tx.amount,
            description: tx.description,
            related_id: tx.related_id,
            created_at: now_unix(),
        };
        self.transactions.push(record.clone());
        record
    }

    fn insert_reward(&mut self, reward: NewReward) -> RewardRecord {
        let now = now_unix();
        let record = RewardRecord {
            id: new_id(),
            title: reward.title,
            description: reward.description,
            points_cost: reward.points_cost,
            category: reward.category,
            is_active: true,
            stock_quantity: reward.stock_quantity,
            created_at: now,
            updated_at: now,
        };
        self.rewards.push(record.clone());
        record
    }

    fn insert_redemption(&mut self, r: NewRedemption) -> StoreResult<RedemptionRecord> {
        if self
            .redemptions
            .iter()
            .any(|x| x.redemption_code == r.redemption_code)
        {
            return Err(StoreError::Duplicate("redemption_code"));
        }
        let now = now_unix();
        let record = RedemptionRecord {
            id: new_id(),
            user_id: r.user_id,
            reward_id: r.reward_id,
            points_spent: r.points_spent,
            status: RedemptionStatus::Pending,
            redemption_code: r.redemption_code,
            created_at: now,
            updated_at: now,
        };
        self.redemptions.push(record.clone());
        Ok(record)
    }

    fn insert_recognition(&mut self, r: NewRecognition) -> RecognitionRecord {
        let now = now_unix();
        let record = RecognitionRecord {
            id: new_id(),
            sender_id: r.sender_id,
            recipient_id: r.recipient_id,
            message: r.message,
            points_amount: r.points_amount,
            is_private: r.is_private,
            created_at: now,
            updated_at: now,
        };
        self.recognitions.push(record.clone());
        record
    }

    fn ledger_stats(&self) -> LedgerStats {
        let total_points_in_system = self
            .users
            .iter()
            .filter(|u| u.is_active)
            .map(|u| u.points_balance)
            .sum();
        let mut by_kind = Vec::new();
        for kind in [
            TransactionType::Allocated,
            TransactionType::Earned,
            TransactionType::Spent,
        ] {
            let entries = self.transactions.iter().filter(|t| t.kind == kind);
            let (count, total) = entries.fold((0i64, 0i64), |(c, t), e| (c + 1, t + e.amount));
            if count > 0 {
                by_kind.push(TypeTotals { kind, count, total });
            }
        }
        LedgerStats {
            total_points_in_system,
            total_transactions: self.transactions.len() as i64,
            by_kind,
        }
    }
}

/// In-memory transaction: holds the store lock and a shadow copy.
struct MemoryTx {
    guard: OwnedMutexGuard<Inner>,
    shadow: Inner,
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = Arc::clone(&self.inner).lock_owned().await;
        let shadow = guard.clone();
        Ok(Box::new(MemoryTx { guard, shadow }))
    }

    async fn user(&self, id: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.inner.lock().await.user(id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_active_users(&self) -> StoreResult<Vec<UserRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().filter(|u| u.is_active).cloned().collect())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        self.inner.lock().await.insert_user(user)
    }

    async fn set_user_active(&self, id: &str, active: bool) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(match inner.user_mut(id) {
            Some(user) => {
                user.is_active = active;
                user.updated_at = now_unix();
                true
            }
            None => false,
        })
    }

    async fn set_user_allocation(&self, id: &str, allocation: i64) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(match inner.user_mut(id) {
            Some(user) => {
                user.monthly_allocation = allocation;
                user.updated_at = now_unix();
                true
            }
            None => false,
        })
    }

    async fn transactions_for_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> StoreResult<Vec<TransactionRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn ledger_stats(&self) -> StoreResult<LedgerStats> {
        Ok(self.inner.lock().await.ledger_stats())
    }

    async fn reward(&self, id: &str) -> StoreResult<Option<RewardRecord>> {
        Ok(self.inner.lock().await.reward(id).cloned())
    }

    async fn list_rewards(&self, active_only: bool) -> StoreResult<Vec<RewardRecord>> {
        let inner = self.inner.lock().await;
        let mut rewards: Vec<_> = inner
            .rewards
            .iter()
            .filter(|r| !active_only || r.is_active)
            .cloned()
            .collect();
        rewards.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then(a.points_cost.cmp(&b.points_cost))
        });
        Ok(rewards)
    }

    async fn insert_reward(&self, reward: NewReward) -> StoreResult<RewardRecord> {
        Ok(self.inner.lock().await.insert_reward(reward))
    }

    async fn update_reward(
        &self,
        id: &str,
        patch: RewardPatch,
    ) -> StoreResult<Option<RewardRecord>> {
        let mut inner = self.inner.lock().await;
        let Some(reward) = inner.reward_mut(id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            reward.title = title;
        }
        if let Some(description) = patch.description {
            reward.description = description;
        }
        if let Some(points_cost) = patch.points_cost {
            reward.points_cost = points_cost;
        }
        if let Some(category) = patch.category {
            reward.category = category;
        }
        if let Some(is_active) = patch.is_active {
            reward.is_active = is_active;
        }
        if let Some(stock_quantity) = patch.stock_quantity {
            reward.stock_quantity = stock_quantity;
        }
        reward.updated_at = now_unix();
        Ok(Some(reward.clone()))
    }

    async fn reward_stats(&self) -> StoreResult<RewardStats> {
        let inner = self.inner.lock().await;
        Ok(RewardStats {
            total_rewards: inner.rewards.len() as i64,
            active_rewards: inner.rewards.iter().filter(|r| r.is_active).count() as i64,
            total_redemptions: inner.redemptions.len() as i64,
            pending_redemptions: inner
                .redemptions
                .iter()
                .filter(|r| r.status == RedemptionStatus::Pending)
                .count() as i64,
        })
    }

    async fn redemption(&self, id: &str) -> StoreResult<Option<RedemptionRecord>> {
        Ok(self.inner.lock().await.redemption(id).cloned())
    }

    async fn redemptions_for_user(&self, user_id: &str) -> StoreResult<Vec<RedemptionRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .redemptions
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_redemptions(&self) -> StoreResult<Vec<RedemptionRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner.redemptions.iter().rev().cloned().collect())
    }

    async fn recognition(&self, id: &str) -> StoreResult<Option<RecognitionRecord>> {
        Ok(self.inner.lock().await.recognition(id).cloned())
    }

    async fn list_recognitions(
        &self,
        filter: &RecognitionFilter,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<RecognitionRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .recognitions
            .iter()
            .rev()
            .filter(|r| matches(filter, r))
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_recognitions(&self, filter: &RecognitionFilter) -> StoreResult<i64> {
        let inner = self.inner.lock().await;
        Ok(inner.recognitions.iter().filter(|r| matches(filter, r)).count() as i64)
    }

    async fn set_recognition_privacy(&self, id: &str, is_private: bool) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        let Some(rec) = inner.recognitions.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        rec.is_private = is_private;
        rec.updated_at = now_unix();
        Ok(true)
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn user_for_update(&mut self, id: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.shadow.user(id).cloned())
    }

    async fn set_user_balance(&mut self, id: &str, balance: i64) -> StoreResult<()> {
        if let Some(user) = self.shadow.user_mut(id) {
            user.points_balance = balance;
            user.updated_at = now_unix();
        }
        Ok(())
    }

    async fn insert_transaction(&mut self, tx: NewTransaction) -> StoreResult<TransactionRecord> {
        Ok(self.shadow.insert_transaction(tx))
    }

    async fn reward_for_update(&mut self, id: &str) -> StoreResult<Option<RewardRecord>> {
        Ok(self.shadow.reward(id).cloned())
    }

    async fn set_reward_stock(&mut self, id: &str, stock: i64) -> StoreResult<()> {
        if let Some(reward) = self.shadow.reward_mut(id) {
            reward.stock_quantity = Some(stock);
            reward.updated_at = now_unix();
        }
        Ok(())
    }

    async fn delete_reward(&mut self, id: &str) -> StoreResult<()> {
        self.shadow.rewards.retain(|r| r.id != id);
        Ok(())
    }

    async fn count_pending_redemptions(&mut self, reward_id: &str) -> StoreResult<i64> {
        Ok(self
            .shadow
            .redemptions
            .iter()
            .filter(|r| r.reward_id == reward_id && r.status == RedemptionStatus::Pending)
            .count() as i64)
    }

    async fn insert_redemption(&mut self, r: NewRedemption) -> StoreResult<RedemptionRecord> {
        self.shadow.insert_redemption(r)
    }

    async fn redemption_for_update(&mut self, id: &str) -> StoreResult<Option<RedemptionRecord>> {
        Ok(self.shadow.redemption(id).cloned())
    }

    async fn set_redemption_status(
        &mut self,
        id: &str,
        status: RedemptionStatus,
    ) -> StoreResult<()> {
        if let Some(r) = self.shadow.redemptions.iter_mut().find(|r| r.id == id) {
            r.status = status;
            r.updated_at = now_unix();
        }
        Ok(())
    }

    async fn insert_recognition(&mut self, r: NewRecognition) -> StoreResult<RecognitionRecord> {
        Ok(self.shadow.insert_recognition(r))
    }

    async fn recognition_for_update(
        &mut self,
        id: &str,
    ) -> StoreResult<Option<RecognitionRecord>> {
        Ok(self.shadow.recognition(id).cloned())
    }

    async fn delete_recognition(&mut self, id: &str) -> StoreResult<()> {
        self.shadow.recognitions.retain(|r| r.id != id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, shadow } = *self;
        *guard = shadow;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kudos_core::Role;

    fn new_user(email: &str, balance: i64) -> NewUser {
        NewUser {
            email: email.into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            department: "Engineering".into(),
            role: Role::Employee,
            points_balance: balance,
            monthly_allocation: 100,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup_user() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("a@example.com", 50)).await.unwrap();

        let found = store.user(&user.id).await.unwrap().unwrap();
        assert_eq!(found.points_balance, 50);
        assert!(found.is_active);

        let by_email = store.user_by_email("a@example.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.insert_user(new_user("a@example.com", 0)).await.unwrap();

        let err = store.insert_user(new_user("a@example.com", 0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("email")));
    }

    #[tokio::test]
    async fn test_commit_makes_writes_visible() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("a@example.com", 10)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.set_user_balance(&user.id, 99).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.user(&user.id).await.unwrap().unwrap().points_balance, 99);
    }

    #[tokio::test]
    async fn test_drop_discards_writes() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("a@example.com", 10)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.set_user_balance(&user.id, 99).await.unwrap();
        drop(tx);

        assert_eq!(store.user(&user.id).await.unwrap().unwrap().points_balance, 10);
    }

    #[tokio::test]
    async fn test_list_active_users_skips_disabled() {
        let store = MemoryStore::new();
        let a = store.insert_user(new_user("a@example.com", 0)).await.unwrap();
        let b = store.insert_user(new_user("b@example.com", 0)).await.unwrap();
        store.set_user_active(&a.id, false).await.unwrap();

        let active = store.list_active_users().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, b.id);
    }

    #[tokio::test]
    async fn test_recognition_filters() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_recognition(NewRecognition {
            sender_id: "a".into(),
            recipient_id: "b".into(),
            message: "public".into(),
            points_amount: 5,
            is_private: false,
        })
        .await
        .unwrap();
        tx.insert_recognition(NewRecognition {
            sender_id: "b".into(),
            recipient_id: "a".into(),
            message: "private".into(),
            points_amount: 5,
            is_private: true,
        })
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let public = store
            .list_recognitions(&RecognitionFilter::Public, 10, 0)
            .await
            .unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].message, "public");

        let involving_a = store
            .count_recognitions(&RecognitionFilter::Involving("a".into()))
            .await
            .unwrap();
        assert_eq!(involving_a, 2);

        let sent_by_b = store
            .count_recognitions(&RecognitionFilter::Sent("b".into()))
            .await
            .unwrap();
        assert_eq!(sent_by_b, 1);
    }
}
