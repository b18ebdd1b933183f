//! Tests for the SQL storage backend against in-memory SQLite.

use kudos_core::{
    NewRecognition, NewRedemption, NewReward, NewTransaction, NewUser, RecognitionFilter,
    RedemptionStatus, RewardPatch, Role, TransactionType,
};

use crate::error::StoreError;
use crate::traits::{Store, StoreTx};

use super::{DatabaseType, SqlStore, SqlStoreConfig};

/// Create a test store with in-memory SQLite and an initialized schema.
///
/// A single connection keeps the in-memory database alive and makes the
/// single-writer model explicit.
async fn setup_test_db() -> SqlStore {
    let config = SqlStoreConfig::new("sqlite::memory:").max_connections(1);
    let store = SqlStore::connect(config).await.expect("Failed to connect");
    store.init_schema().await.expect("Failed to create schema");
    store
}

fn new_user(email: &str, balance: i64) -> NewUser {
    NewUser {
        email: email.into(),
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
        department: "Engineering".into(),
        role: Role::Employee,
        points_balance: balance,
        monthly_allocation: 100,
    }
}

fn new_reward(title: &str, cost: i64, stock: Option<i64>) -> NewReward {
    NewReward {
        title: title.into(),
        description: "A reward".into(),
        points_cost: cost,
        category: "Perks".into(),
        stock_quantity: stock,
    }
}

#[test]
fn test_database_type_detection() {
    assert_eq!(
        DatabaseType::from_url("postgres://localhost/db"),
        Some(DatabaseType::PostgreSQL)
    );
    assert_eq!(
        DatabaseType::from_url("postgresql://localhost/db"),
        Some(DatabaseType::PostgreSQL)
    );
    assert_eq!(
        DatabaseType::from_url("mysql://localhost/db"),
        Some(DatabaseType::MySQL)
    );
    assert_eq!(
        DatabaseType::from_url("sqlite::memory:"),
        Some(DatabaseType::SQLite)
    );
    assert_eq!(DatabaseType::from_url("redis://localhost"), None);
}

#[tokio::test]
async fn test_insert_and_fetch_user() {
    let store = setup_test_db().await;
    let user = store.insert_user(new_user("g@example.com", 500)).await.unwrap();

    let found = store.user(&user.id).await.unwrap().expect("user missing");
    assert_eq!(found.email, "g@example.com");
    assert_eq!(found.points_balance, 500);
    assert_eq!(found.role, Role::Employee);
    assert!(found.is_active);

    assert!(store.user("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_email_maps_to_duplicate_error() {
    let store = setup_test_db().await;
    store.insert_user(new_user("g@example.com", 0)).await.unwrap();

    let err = store.insert_user(new_user("g@example.com", 0)).await.unwrap_err();
    assert!(matches!(err, StoreError::Duplicate("email")));
}

#[tokio::test]
async fn test_transaction_commit_and_rollback() {
    let store = setup_test_db().await;
    let user = store.insert_user(new_user("g@example.com", 100)).await.unwrap();

    // committed writes become visible
    let mut tx = store.begin().await.unwrap();
    let locked = tx.user_for_update(&user.id).await.unwrap().unwrap();
    assert_eq!(locked.points_balance, 100);
    tx.set_user_balance(&user.id, 40).await.unwrap();
    tx.insert_transaction(NewTransaction {
        user_id: user.id.clone(),
        kind: TransactionType::Spent,
        amount: -60,
        description: "spent".into(),
        related_id: None,
    })
    .await
    .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(store.user(&user.id).await.unwrap().unwrap().points_balance, 40);

    // rolled-back writes are discarded
    let mut tx = store.begin().await.unwrap();
    tx.set_user_balance(&user.id, 0).await.unwrap();
    tx.rollback().await.unwrap();

    assert_eq!(store.user(&user.id).await.unwrap().unwrap().points_balance, 40);

    let history = store.transactions_for_user(&user.id, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].amount, -60);
    assert_eq!(history[0].kind, TransactionType::Spent);
}

#[tokio::test]
async fn test_history_is_newest_first_and_limited() {
    let store = setup_test_db().await;
    let user = store.insert_user(new_user("g@example.com", 0)).await.unwrap();

    let mut tx = store.begin().await.unwrap();
    for i in 1..=3 {
        tx.insert_transaction(NewTransaction {
            user_id: user.id.clone(),
            kind: TransactionType::Earned,
            amount: i,
            description: format!("entry {i}"),
            related_id: None,
        })
        .await
        .unwrap();
    }
    tx.commit().await.unwrap();

    let history = store.transactions_for_user(&user.id, 2).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].amount, 3);
    assert_eq!(history[1].amount, 2);
}

#[tokio::test]
async fn test_reward_patch_updates_selected_fields() {
    let store = setup_test_db().await;
    let reward = store.insert_reward(new_reward("Mug", 100, Some(5))).await.unwrap();

    let updated = store
        .update_reward(
            &reward.id,
            RewardPatch {
                points_cost: Some(150),
                stock_quantity: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("reward missing");

    assert_eq!(updated.title, "Mug");
    assert_eq!(updated.points_cost, 150);
    assert_eq!(updated.stock_quantity, None);

    assert!(store
        .update_reward("nope", RewardPatch::default())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_redemption_lifecycle_rows() {
    let store = setup_test_db().await;
    let user = store.insert_user(new_user("g@example.com", 0)).await.unwrap();
    let reward = store.insert_reward(new_reward("Mug", 100, Some(5))).await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let redemption = tx
        .insert_redemption(NewRedemption {
            user_id: user.id.clone(),
            reward_id: reward.id.clone(),
            points_spent: 100,
            redemption_code: "AB12CD34".into(),
        })
        .await
        .unwrap();
    assert_eq!(redemption.status, RedemptionStatus::Pending);
    assert_eq!(tx.count_pending_redemptions(&reward.id).await.unwrap(), 1);
    tx.set_redemption_status(&redemption.id, RedemptionStatus::Fulfilled)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let stored = store.redemption(&redemption.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RedemptionStatus::Fulfilled);
    assert_eq!(stored.redemption_code, "AB12CD34");

    let stats = store.reward_stats().await.unwrap();
    assert_eq!(stats.total_redemptions, 1);
    assert_eq!(stats.pending_redemptions, 0);
}

#[tokio::test]
async fn test_recognition_filters_and_pagination() {
    let store = setup_test_db().await;

    let mut tx = store.begin().await.unwrap();
    for i in 0..3 {
        tx.insert_recognition(NewRecognition {
            sender_id: "a".into(),
            recipient_id: "b".into(),
            message: format!("thanks {i}"),
            points_amount: 10,
            is_private: i == 2,
        })
        .await
        .unwrap();
    }
    tx.commit().await.unwrap();

    let public = store
        .list_recognitions(&RecognitionFilter::Public, 10, 0)
        .await
        .unwrap();
    assert_eq!(public.len(), 2);
    // newest first
    assert_eq!(public[0].message, "thanks 1");

    let count = store
        .count_recognitions(&RecognitionFilter::Sent("a".into()))
        .await
        .unwrap();
    assert_eq!(count, 3);

    let page = store
        .list_recognitions(&RecognitionFilter::Involving("b".into()), 2, 1)
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].message, "thanks 1");
}

#[tokio::test]
async fn test_ledger_stats_aggregates() {
    let store = setup_test_db().await;
    let a = store.insert_user(new_user("a@example.com", 300)).await.unwrap();
    let b = store.insert_user(new_user("b@example.com", 200)).await.unwrap();
    store.set_user_active(&b.id, false).await.unwrap();

    let mut tx = store.begin().await.unwrap();
    tx.insert_transaction(NewTransaction {
        user_id: a.id.clone(),
        kind: TransactionType::Allocated,
        amount: 100,
        description: "Monthly points allocation".into(),
        related_id: None,
    })
    .await
    .unwrap();
    tx.insert_transaction(NewTransaction {
        user_id: a.id.clone(),
        kind: TransactionType::Spent,
        amount: -50,
        description: "spent".into(),
        related_id: None,
    })
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let stats = store.ledger_stats().await.unwrap();
    // only the active user's balance counts
    assert_eq!(stats.total_points_in_system, 300);
    assert_eq!(stats.total_transactions, 2);
    assert_eq!(stats.by_kind.len(), 2);
    let allocated = stats
        .by_kind
        .iter()
        .find(|t| t.kind == TransactionType::Allocated)
        .unwrap();
    assert_eq!(allocated.count, 1);
    assert_eq!(allocated.total, 100);
}
