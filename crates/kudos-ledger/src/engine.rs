//! The [`Ledger`] engine.

use std::sync::Arc;

use kudos_core::defaults::DEFAULT_HISTORY_LIMIT;
use kudos_core::{
    BalanceView, Error, LedgerOutcome, LedgerStats, Result, TransactionRecord, TransactionType,
    TransferOutcome, UserRecord,
};
use kudos_store::{Store, StoreTx};

use crate::ops;

/// Balance mutation engine over a shared [`Store`].
///
/// Each mutating method wraps one storage transaction; validation runs
/// against rows re-read inside it. The engine keeps no state of its own, so
/// it is cheap to clone and share across concurrent operations.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn Store>,
}

impl Ledger {
    /// Create a ledger over the given store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Current balance and monthly allowance for an active user.
    pub async fn balance(&self, user_id: &str) -> Result<BalanceView> {
        let user = self
            .store
            .user(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(Error::UserNotFound)?;
        Ok(BalanceView {
            points_balance: user.points_balance,
            monthly_allocation: user.monthly_allocation,
        })
    }

    /// Most recent ledger entries for a user, newest first.
    pub async fn history(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<TransactionRecord>> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        Ok(self.store.transactions_for_user(user_id, limit).await?)
    }

    /// Credit points to a user.
    pub async fn credit(
        &self,
        user_id: &str,
        amount: i64,
        description: &str,
        kind: TransactionType,
        related_id: Option<&str>,
    ) -> Result<LedgerOutcome> {
        let mut tx = self.store.begin().await?;
        let outcome =
            ops::credit_in_tx(tx.as_mut(), user_id, amount, description, kind, related_id).await?;
        tx.commit().await?;
        kudos_metrics::record_credit();
        Ok(outcome)
    }

    /// Debit points from a user.
    pub async fn debit(
        &self,
        user_id: &str,
        amount: i64,
        description: &str,
        related_id: Option<&str>,
    ) -> Result<LedgerOutcome> {
        let mut tx = self.store.begin().await?;
        let outcome =
            ops::debit_in_tx(tx.as_mut(), user_id, amount, description, related_id).await?;
        tx.commit().await?;
        kudos_metrics::record_debit();
        Ok(outcome)
    }

    /// Atomically move points between two users.
    pub async fn transfer(
        &self,
        from_user_id: &str,
        to_user_id: &str,
        amount: i64,
        description: &str,
        related_id: Option<&str>,
    ) -> Result<TransferOutcome> {
        let mut tx = self.store.begin().await?;
        let outcome = ops::transfer_in_tx(
            tx.as_mut(),
            from_user_id,
            to_user_id,
            amount,
            description,
            related_id,
        )
        .await?;
        tx.commit().await?;
        kudos_metrics::record_transfer(outcome.amount as u64);
        Ok(outcome)
    }

    /// Overwrite a user's monthly allowance.
    pub async fn set_monthly_allocation(
        &self,
        user_id: &str,
        allocation: i64,
    ) -> Result<UserRecord> {
        if allocation < 0 {
            return Err(Error::invalid("monthly allocation must be non-negative"));
        }
        if !self.store.set_user_allocation(user_id, allocation).await? {
            return Err(Error::UserNotFound);
        }
        self.store
            .user(user_id)
            .await?
            .ok_or(Error::UserNotFound)
    }

    /// System-wide ledger aggregates.
    pub async fn statistics(&self) -> Result<LedgerStats> {
        Ok(self.store.ledger_stats().await?)
    }
}
