//! Transaction-scoped ledger primitives.
//!
//! These functions run inside a caller-provided [`StoreTx`] and perform the
//! full read-check-write-record sequence without committing, so an engine
//! can couple a ledger mutation to its own rows (a recognition, a
//! redemption) in one atomic transaction. [`Ledger`](crate::Ledger) wraps
//! each of them in a single-purpose transaction for standalone use.

use kudos_core::{
    Error, LedgerOutcome, NewTransaction, Result, TransactionType, TransferOutcome, UserRecord,
};
use kudos_store::StoreTx;

/// Locked read of an active user, mapping missing or deactivated accounts
/// to [`Error::UserNotFound`].
async fn active_user_for_update(tx: &mut dyn StoreTx, user_id: &str) -> Result<UserRecord> {
    tx.user_for_update(user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or(Error::UserNotFound)
}

/// Credit `amount` points to a user and append the matching ledger entry.
pub async fn credit_in_tx(
    tx: &mut dyn StoreTx,
    user_id: &str,
    amount: i64,
    description: &str,
    kind: TransactionType,
    related_id: Option<&str>,
) -> Result<LedgerOutcome> {
    if amount <= 0 {
        return Err(Error::NonPositiveAmount);
    }

    let user = active_user_for_update(tx, user_id).await?;
    let new_balance = user.points_balance + amount;

    tx.set_user_balance(user_id, new_balance).await?;
    tx.insert_transaction(NewTransaction {
        user_id: user_id.to_owned(),
        kind,
        amount,
        description: description.to_owned(),
        related_id: related_id.map(str::to_owned),
    })
    .await?;

    Ok(LedgerOutcome {
        new_balance,
        amount,
    })
}

/// Debit `amount` points from a user and append the matching ledger entry.
///
/// No overdraft and no partial debit: the balance check runs against the
/// freshly-read row inside the transaction.
pub async fn debit_in_tx(
    tx: &mut dyn StoreTx,
    user_id: &str,
    amount: i64,
    description: &str,
    related_id: Option<&str>,
) -> Result<LedgerOutcome> {
    if amount <= 0 {
        return Err(Error::NonPositiveAmount);
    }

    let user = active_user_for_update(tx, user_id).await?;
    if user.points_balance < amount {
        return Err(Error::InsufficientBalance);
    }
    let new_balance = user.points_balance - amount;

    tx.set_user_balance(user_id, new_balance).await?;
    tx.insert_transaction(NewTransaction {
        user_id: user_id.to_owned(),
        kind: TransactionType::Spent,
        amount: -amount,
        description: description.to_owned(),
        related_id: related_id.map(str::to_owned),
    })
    .await?;

    Ok(LedgerOutcome {
        new_balance,
        amount,
    })
}

/// Move `amount` points from one user to another, appending a linked debit
/// and credit that share `related_id`. Descriptions embed the counterparty's
/// display name.
///
/// Row locks are taken sender-first; crossing transfers are resolved by the
/// database's deadlock detection.
pub async fn transfer_in_tx(
    tx: &mut dyn StoreTx,
    from_user_id: &str,
    to_user_id: &str,
    amount: i64,
    description: &str,
    related_id: Option<&str>,
) -> Result<TransferOutcome> {
    if amount <= 0 {
        return Err(Error::NonPositiveAmount);
    }
    if from_user_id == to_user_id {
        return Err(Error::SelfTransfer);
    }

    let sender = active_user_for_update(tx, from_user_id).await?;
    if sender.points_balance < amount {
        return Err(Error::InsufficientBalance);
    }
    let recipient = active_user_for_update(tx, to_user_id).await?;

    let sender_new_balance = sender.points_balance - amount;
    let recipient_new_balance = recipient.points_balance + amount;

    tx.set_user_balance(from_user_id, sender_new_balance).await?;
    tx.set_user_balance(to_user_id, recipient_new_balance).await?;

    tx.insert_transaction(NewTransaction {
        user_id: from_user_id.to_owned(),
        kind: TransactionType::Spent,
        amount: -amount,
        description: format!("Sent to {}: {}", recipient.display_name(), description),
        related_id: related_id.map(str::to_owned),
    })
    .await?;
    tx.insert_transaction(NewTransaction {
        user_id: to_user_id.to_owned(),
        kind: TransactionType::Earned,
        amount,
        description: format!("Received from {}: {}", sender.display_name(), description),
        related_id: related_id.map(str::to_owned),
    })
    .await?;

    Ok(TransferOutcome {
        sender_new_balance,
        recipient_new_balance,
        amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kudos_core::{NewUser, Role};
    use kudos_store::{MemoryStore, Store};

    async fn seed_user(store: &MemoryStore, email: &str, balance: i64) -> String {
        store
            .insert_user(NewUser {
                email: email.into(),
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                department: "Engineering".into(),
                role: Role::Employee,
                points_balance: balance,
                monthly_allocation: 0,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_credit_updates_balance_and_appends_record() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "a@example.com", 10).await;

        let mut tx = store.begin().await.unwrap();
        let out = credit_in_tx(
            tx.as_mut(),
            &user,
            40,
            "bonus",
            TransactionType::Earned,
            None,
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(out, LedgerOutcome { new_balance: 50, amount: 40 });

        let history = store.transactions_for_user(&user, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].amount, 40);
        assert_eq!(history[0].kind, TransactionType::Earned);
    }

    #[tokio::test]
    async fn test_credit_rejects_non_positive_and_missing_user() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "a@example.com", 10).await;

        let mut tx = store.begin().await.unwrap();
        let err = credit_in_tx(tx.as_mut(), &user, 0, "x", TransactionType::Earned, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NonPositiveAmount));

        let err = credit_in_tx(tx.as_mut(), "ghost", 5, "x", TransactionType::Earned, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UserNotFound));
    }

    #[tokio::test]
    async fn test_debit_refuses_overdraft() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "a@example.com", 50).await;

        let mut tx = store.begin().await.unwrap();
        let err = debit_in_tx(tx.as_mut(), &user, 60, "too much", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientBalance));
        drop(tx);

        // nothing was applied
        let after = store.user(&user).await.unwrap().unwrap();
        assert_eq!(after.points_balance, 50);
        assert!(store.transactions_for_user(&user, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_debit_records_negative_amount() {
        let store = MemoryStore::new();
        let user = seed_user(&store, "a@example.com", 50).await;

        let mut tx = store.begin().await.unwrap();
        let out = debit_in_tx(tx.as_mut(), &user, 20, "redeemed", Some("r1"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(out.new_balance, 30);
        let history = store.transactions_for_user(&user, 10).await.unwrap();
        assert_eq!(history[0].amount, -20);
        assert_eq!(history[0].related_id.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn test_transfer_moves_points_and_links_records() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a@example.com", 500).await;
        let b = seed_user(&store, "b@example.com", 300).await;

        let mut tx = store.begin().await.unwrap();
        let out = transfer_in_tx(tx.as_mut(), &a, &b, 100, "great work", Some("rec-1"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(out.sender_new_balance, 400);
        assert_eq!(out.recipient_new_balance, 400);

        let sender_history = store.transactions_for_user(&a, 10).await.unwrap();
        let recipient_history = store.transactions_for_user(&b, 10).await.unwrap();
        assert_eq!(sender_history[0].amount, -100);
        assert_eq!(recipient_history[0].amount, 100);
        assert_eq!(sender_history[0].related_id.as_deref(), Some("rec-1"));
        assert_eq!(recipient_history[0].related_id, sender_history[0].related_id);
        assert!(sender_history[0].description.starts_with("Sent to Ada Lovelace:"));
        assert!(recipient_history[0]
            .description
            .starts_with("Received from Ada Lovelace:"));
    }

    #[tokio::test]
    async fn test_transfer_to_self_always_fails() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a@example.com", 500).await;

        let mut tx = store.begin().await.unwrap();
        let err = transfer_in_tx(tx.as_mut(), &a, &a, 50, "self", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SelfTransfer));
    }

    #[tokio::test]
    async fn test_transfer_to_inactive_recipient_fails() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a@example.com", 500).await;
        let b = seed_user(&store, "b@example.com", 0).await;
        store.set_user_active(&b, false).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let err = transfer_in_tx(tx.as_mut(), &a, &b, 50, "gone", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UserNotFound));
    }
}
