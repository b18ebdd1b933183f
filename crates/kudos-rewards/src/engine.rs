//! The [`Rewards`] engine.

use std::sync::Arc;

use tracing::info;

use kudos_core::{
    redemption_code, Error, NewRedemption, NewReward, RedemptionDetail, RedemptionRecord,
    RedemptionStatus, Result, RewardPatch, RewardRecord, RewardStats, TransactionType,
};
use kudos_ledger::ops;
use kudos_store::{Store, StoreTx};

/// Reward catalog and redemption engine over a shared [`Store`].
#[derive(Clone)]
pub struct Rewards {
    store: Arc<dyn Store>,
}

impl Rewards {
    /// Create a rewards engine over the given store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    // --- catalog ---

    /// Create a reward. Cost must be at least 1; stock, when limited, must
    /// not start negative.
    pub async fn create_reward(&self, reward: NewReward) -> Result<RewardRecord> {
        if reward.points_cost < 1 {
            return Err(Error::invalid("points cost must be at least 1"));
        }
        if matches!(reward.stock_quantity, Some(stock) if stock < 0) {
            return Err(Error::invalid("stock quantity must be non-negative"));
        }
        Ok(self.store.insert_reward(reward).await?)
    }

    /// Apply a partial update to a reward.
    pub async fn update_reward(&self, id: &str, patch: RewardPatch) -> Result<RewardRecord> {
        if matches!(patch.points_cost, Some(cost) if cost < 1) {
            return Err(Error::invalid("points cost must be at least 1"));
        }
        if matches!(patch.stock_quantity, Some(Some(stock)) if stock < 0) {
            return Err(Error::invalid("stock quantity must be non-negative"));
        }
        self.store
            .update_reward(id, patch)
            .await?
            .ok_or(Error::RewardNotFound)
    }

    /// Look up a reward.
    pub async fn reward(&self, id: &str) -> Result<RewardRecord> {
        self.store.reward(id).await?.ok_or(Error::RewardNotFound)
    }

    /// List the catalog, ordered by category then cost.
    pub async fn list_rewards(&self, active_only: bool) -> Result<Vec<RewardRecord>> {
        Ok(self.store.list_rewards(active_only).await?)
    }

    /// Delete a reward. Blocked while any PENDING redemption references it.
    pub async fn delete_reward(&self, id: &str) -> Result<()> {
        let mut tx = self.store.begin().await?;
        tx.reward_for_update(id).await?.ok_or(Error::RewardNotFound)?;
        if tx.count_pending_redemptions(id).await? > 0 {
            return Err(Error::PendingRedemptions);
        }
        tx.delete_reward(id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Catalog and redemption aggregates.
    pub async fn statistics(&self) -> Result<RewardStats> {
        Ok(self.store.reward_stats().await?)
    }

    // --- redemptions ---

    /// Redeem a reward for a user.
    ///
    /// Inside one transaction: re-reads the reward (active, in stock),
    /// debits the snapshot cost through the ledger (which re-checks the
    /// balance), decrements limited stock by exactly one, and creates a
    /// PENDING redemption with a fresh code. Unlimited-stock rewards never
    /// touch the stock column.
    pub async fn redeem(&self, user_id: &str, reward_id: &str) -> Result<RedemptionDetail> {
        let mut tx = self.store.begin().await?;

        let reward = tx
            .reward_for_update(reward_id)
            .await?
            .ok_or(Error::RewardNotFound)?;
        if !reward.is_active {
            return Err(Error::RewardInactive);
        }
        if matches!(reward.stock_quantity, Some(stock) if stock <= 0) {
            return Err(Error::OutOfStock);
        }

        ops::debit_in_tx(
            tx.as_mut(),
            user_id,
            reward.points_cost,
            &format!("Redeemed reward: {}", reward.title),
            Some(reward_id),
        )
        .await?;

        if let Some(stock) = reward.stock_quantity {
            tx.set_reward_stock(reward_id, stock - 1).await?;
        }

        let redemption = tx
            .insert_redemption(NewRedemption {
                user_id: user_id.to_owned(),
                reward_id: reward_id.to_owned(),
                points_spent: reward.points_cost,
                redemption_code: redemption_code(),
            })
            .await?;

        tx.commit().await?;
        kudos_metrics::record_redemption();
        info!(
            user = %user_id,
            reward = %reward_id,
            code = %redemption.redemption_code,
            "reward redeemed"
        );

        self.detail(redemption).await
    }

    /// Overwrite a redemption's status.
    ///
    /// A PENDING redemption moved to CANCELLED is refunded: the user is
    /// credited `points_spent` and limited stock is restored by one, in the
    /// same transaction as the status write. Every other transition is a
    /// plain overwrite with no side effects, so repeated cancellation can
    /// never double-refund.
    pub async fn set_status(
        &self,
        redemption_id: &str,
        status: RedemptionStatus,
    ) -> Result<RedemptionDetail> {
        let mut tx = self.store.begin().await?;

        let redemption = tx
            .redemption_for_update(redemption_id)
            .await?
            .ok_or(Error::RedemptionNotFound)?;

        let refunding = status == RedemptionStatus::Cancelled
            && redemption.status == RedemptionStatus::Pending;
        if refunding {
            let reward = tx
                .reward_for_update(&redemption.reward_id)
                .await?
                .ok_or(Error::RewardNotFound)?;

            ops::credit_in_tx(
                tx.as_mut(),
                &redemption.user_id,
                redemption.points_spent,
                &format!("Refund for cancelled redemption: {}", reward.title),
                TransactionType::Earned,
                Some(redemption_id),
            )
            .await?;

            if let Some(stock) = reward.stock_quantity {
                tx.set_reward_stock(&redemption.reward_id, stock + 1).await?;
            }
        }

        tx.set_redemption_status(redemption_id, status).await?;
        tx.commit().await?;

        if refunding {
            kudos_metrics::record_refund();
            info!(redemption = %redemption_id, "redemption cancelled and refunded");
        }

        let updated = self
            .store
            .redemption(redemption_id)
            .await?
            .ok_or(Error::RedemptionNotFound)?;
        self.detail(updated).await
    }

    /// Look up a redemption with user and reward detail.
    pub async fn redemption(&self, id: &str) -> Result<RedemptionDetail> {
        let redemption = self
            .store
            .redemption(id)
            .await?
            .ok_or(Error::RedemptionNotFound)?;
        self.detail(redemption).await
    }

    /// A user's redemptions, newest first.
    pub async fn redemptions_for_user(&self, user_id: &str) -> Result<Vec<RedemptionRecord>> {
        Ok(self.store.redemptions_for_user(user_id).await?)
    }

    /// All redemptions, newest first.
    pub async fn list_redemptions(&self) -> Result<Vec<RedemptionRecord>> {
        Ok(self.store.list_redemptions().await?)
    }

    async fn detail(&self, redemption: RedemptionRecord) -> Result<RedemptionDetail> {
        let user = self
            .store
            .user(&redemption.user_id)
            .await?
            .ok_or(Error::UserNotFound)?;
        let reward = self
            .store
            .reward(&redemption.reward_id)
            .await?
            .ok_or(Error::RewardNotFound)?;
        Ok(RedemptionDetail {
            redemption,
            user,
            reward,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kudos_core::{NewUser, Role};
    use kudos_store::MemoryStore;

    async fn seed_user(store: &MemoryStore, email: &str, balance: i64) -> String {
        store
            .insert_user(NewUser {
                email: email.into(),
                first_name: "Katherine".into(),
                last_name: "Johnson".into(),
                department: "Research".into(),
                role: Role::Employee,
                points_balance: balance,
                monthly_allocation: 0,
            })
            .await
            .unwrap()
            .id
    }

    fn engine(store: &MemoryStore) -> Rewards {
        Rewards::new(Arc::new(store.clone()))
    }

    async fn seed_reward(rewards: &Rewards, cost: i64, stock: Option<i64>) -> RewardRecord {
        rewards
            .create_reward(NewReward {
                title: "Coffee mug".into(),
                description: "Branded".into(),
                points_cost: cost,
                category: "Swag".into(),
                stock_quantity: stock,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_redeem_debits_and_decrements_stock() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "k@example.com", 500).await;
        let rewards = engine(&store);
        let reward = seed_reward(&rewards, 100, Some(10)).await;

        let detail = rewards.redeem(&user, &reward.id).await.unwrap();

        assert_eq!(detail.redemption.status, RedemptionStatus::Pending);
        assert_eq!(detail.redemption.points_spent, 100);
        assert_eq!(detail.redemption.redemption_code.len(), 8);
        assert!(detail
            .redemption
            .redemption_code
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));

        assert_eq!(store.user(&user).await.unwrap().unwrap().points_balance, 400);
        assert_eq!(
            store.reward(&reward.id).await.unwrap().unwrap().stock_quantity,
            Some(9)
        );

        let history = store.transactions_for_user(&user, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount, -100);
        assert_eq!(history[0].related_id.as_deref(), Some(reward.id.as_str()));
        assert_eq!(history[0].description, "Redeemed reward: Coffee mug");
    }

    #[tokio::test]
    async fn test_cancel_pending_refunds_once() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "k@example.com", 500).await;
        let rewards = engine(&store);
        let reward = seed_reward(&rewards, 100, Some(10)).await;

        let detail = rewards.redeem(&user, &reward.id).await.unwrap();
        let cancelled = rewards
            .set_status(&detail.redemption.id, RedemptionStatus::Cancelled)
            .await
            .unwrap();

        assert_eq!(cancelled.redemption.status, RedemptionStatus::Cancelled);
        assert_eq!(store.user(&user).await.unwrap().unwrap().points_balance, 500);
        assert_eq!(
            store.reward(&reward.id).await.unwrap().unwrap().stock_quantity,
            Some(10)
        );

        let history = store.transactions_for_user(&user, 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].amount, 100);
        assert_eq!(history[0].kind, TransactionType::Earned);
        assert_eq!(
            history[0].related_id.as_deref(),
            Some(detail.redemption.id.as_str())
        );

        // cancelling again is a plain overwrite with no second refund
        let again = rewards
            .set_status(&detail.redemption.id, RedemptionStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(again.redemption.status, RedemptionStatus::Cancelled);
        assert_eq!(store.user(&user).await.unwrap().unwrap().points_balance, 500);
        assert_eq!(
            store.reward(&reward.id).await.unwrap().unwrap().stock_quantity,
            Some(10)
        );
    }

    #[tokio::test]
    async fn test_cancel_after_approval_keeps_points_and_stock() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "k@example.com", 500).await;
        let rewards = engine(&store);
        let reward = seed_reward(&rewards, 100, Some(10)).await;

        let detail = rewards.redeem(&user, &reward.id).await.unwrap();
        rewards
            .set_status(&detail.redemption.id, RedemptionStatus::Approved)
            .await
            .unwrap();
        let cancelled = rewards
            .set_status(&detail.redemption.id, RedemptionStatus::Cancelled)
            .await
            .unwrap();

        assert_eq!(cancelled.redemption.status, RedemptionStatus::Cancelled);
        assert_eq!(store.user(&user).await.unwrap().unwrap().points_balance, 400);
        assert_eq!(
            store.reward(&reward.id).await.unwrap().unwrap().stock_quantity,
            Some(9)
        );
    }

    #[tokio::test]
    async fn test_unlimited_stock_never_writes_stock() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "k@example.com", 1000).await;
        let rewards = engine(&store);
        let reward = seed_reward(&rewards, 100, None).await;

        for _ in 0..3 {
            rewards.redeem(&user, &reward.id).await.unwrap();
        }
        assert_eq!(
            store.reward(&reward.id).await.unwrap().unwrap().stock_quantity,
            None
        );
        assert_eq!(store.user(&user).await.unwrap().unwrap().points_balance, 700);

        // cancelling one also leaves stock untouched
        let redemptions = rewards.redemptions_for_user(&user).await.unwrap();
        rewards
            .set_status(&redemptions[0].id, RedemptionStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(
            store.reward(&reward.id).await.unwrap().unwrap().stock_quantity,
            None
        );
    }

    #[tokio::test]
    async fn test_redeem_rejects_inactive_out_of_stock_and_poor_balance() {
        let store = MemoryStore::new();
        let rich = seed_user(&store, "rich@example.com", 500).await;
        let poor = seed_user(&store, "poor@example.com", 10).await;
        let rewards = engine(&store);

        let inactive = seed_reward(&rewards, 100, None).await;
        rewards
            .update_reward(
                &inactive.id,
                RewardPatch {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(matches!(
            rewards.redeem(&rich, &inactive.id).await.unwrap_err(),
            Error::RewardInactive
        ));

        let sold_out = seed_reward(&rewards, 100, Some(0)).await;
        assert!(matches!(
            rewards.redeem(&rich, &sold_out.id).await.unwrap_err(),
            Error::OutOfStock
        ));

        let mug = seed_reward(&rewards, 100, Some(5)).await;
        assert!(matches!(
            rewards.redeem(&poor, &mug.id).await.unwrap_err(),
            Error::InsufficientBalance
        ));

        // nothing was applied anywhere
        assert_eq!(store.user(&poor).await.unwrap().unwrap().points_balance, 10);
        assert_eq!(
            store.reward(&mug.id).await.unwrap().unwrap().stock_quantity,
            Some(5)
        );
        assert!(rewards.list_redemptions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_blocked_by_pending_redemption() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "k@example.com", 500).await;
        let rewards = engine(&store);
        let reward = seed_reward(&rewards, 100, Some(10)).await;

        let detail = rewards.redeem(&user, &reward.id).await.unwrap();
        assert!(matches!(
            rewards.delete_reward(&reward.id).await.unwrap_err(),
            Error::PendingRedemptions
        ));

        rewards
            .set_status(&detail.redemption.id, RedemptionStatus::Fulfilled)
            .await
            .unwrap();
        rewards.delete_reward(&reward.id).await.unwrap();
        assert!(matches!(
            rewards.reward(&reward.id).await.unwrap_err(),
            Error::RewardNotFound
        ));
    }

    #[tokio::test]
    async fn test_create_reward_validates_cost_and_stock() {
        let store = MemoryStore::new();
        let rewards = engine(&store);

        let err = rewards
            .create_reward(NewReward {
                title: "Free".into(),
                description: "".into(),
                points_cost: 0,
                category: "Swag".into(),
                stock_quantity: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));

        let err = rewards
            .create_reward(NewReward {
                title: "Negative".into(),
                description: "".into(),
                points_cost: 10,
                category: "Swag".into(),
                stock_quantity: Some(-1),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
    }
}
