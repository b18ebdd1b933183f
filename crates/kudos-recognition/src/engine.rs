//! The [`Recognitions`] engine.

use std::sync::Arc;

use tracing::info;

use kudos_core::defaults::{DEFAULT_FEED_LIMIT, MAX_RECOGNITION_POINTS};
use kudos_core::{
    Error, NewRecognition, RecognitionFilter, RecognitionPage, RecognitionRecord, Result,
};
use kudos_ledger::ops;
use kudos_store::{Store, StoreTx};

/// Which side of a user's recognitions to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognitionQuery {
    Sent,
    Received,
    #[default]
    All,
}

impl RecognitionQuery {
    fn filter(self, user_id: &str) -> RecognitionFilter {
        match self {
            RecognitionQuery::Sent => RecognitionFilter::Sent(user_id.to_owned()),
            RecognitionQuery::Received => RecognitionFilter::Received(user_id.to_owned()),
            RecognitionQuery::All => RecognitionFilter::Involving(user_id.to_owned()),
        }
    }
}

/// Recognition workflow over a shared [`Store`].
#[derive(Clone)]
pub struct Recognitions {
    store: Arc<dyn Store>,
}

impl Recognitions {
    /// Create a recognition engine over the given store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Send a recognition.
    ///
    /// Inside one transaction: verifies the recipient, writes the
    /// recognition row, then transfers the points with the recognition id as
    /// `related_id`. A failed transfer (insufficient sender balance,
    /// deactivated sender) rolls back the row — recognition and transfer are
    /// all-or-nothing.
    pub async fn create(
        &self,
        sender_id: &str,
        recipient_id: &str,
        message: &str,
        points_amount: i64,
        is_private: bool,
    ) -> Result<RecognitionRecord> {
        if sender_id == recipient_id {
            return Err(Error::SelfRecognition);
        }
        if points_amount <= 0 {
            return Err(Error::NonPositiveAmount);
        }
        if points_amount > MAX_RECOGNITION_POINTS {
            return Err(Error::AmountOverCap);
        }

        let mut tx = self.store.begin().await?;

        tx.user_for_update(recipient_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(Error::UserNotFound)?;

        let recognition = tx
            .insert_recognition(NewRecognition {
                sender_id: sender_id.to_owned(),
                recipient_id: recipient_id.to_owned(),
                message: message.to_owned(),
                points_amount,
                is_private,
            })
            .await?;

        ops::transfer_in_tx(
            tx.as_mut(),
            sender_id,
            recipient_id,
            points_amount,
            &format!("Recognition: {message}"),
            Some(&recognition.id),
        )
        .await?;

        tx.commit().await?;
        kudos_metrics::record_recognition();
        info!(
            sender = %sender_id,
            recipient = %recipient_id,
            points = points_amount,
            "recognition sent"
        );

        Ok(recognition)
    }

    /// The public feed, newest first.
    pub async fn feed(&self, limit: Option<i64>, offset: i64) -> Result<RecognitionPage> {
        self.page(&RecognitionFilter::Public, limit, offset).await
    }

    /// One user's recognitions, newest first.
    pub async fn for_user(
        &self,
        user_id: &str,
        query: RecognitionQuery,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<RecognitionPage> {
        self.page(&query.filter(user_id), limit, offset).await
    }

    /// Look up a recognition. Private recognitions are visible only to
    /// their sender and recipient.
    pub async fn get(&self, id: &str, viewer_id: &str) -> Result<RecognitionRecord> {
        let recognition = self
            .store
            .recognition(id)
            .await?
            .ok_or(Error::RecognitionNotFound)?;

        if recognition.is_private
            && recognition.sender_id != viewer_id
            && recognition.recipient_id != viewer_id
        {
            return Err(Error::PrivateRecognition);
        }

        Ok(recognition)
    }

    /// Flip a recognition's privacy flag. Sender-only.
    pub async fn set_privacy(
        &self,
        id: &str,
        caller_id: &str,
        is_private: bool,
    ) -> Result<RecognitionRecord> {
        let recognition = self
            .store
            .recognition(id)
            .await?
            .ok_or(Error::RecognitionNotFound)?;
        if recognition.sender_id != caller_id {
            return Err(Error::NotOwner);
        }

        self.store.set_recognition_privacy(id, is_private).await?;
        self.store
            .recognition(id)
            .await?
            .ok_or(Error::RecognitionNotFound)
    }

    /// Delete a recognition. Sender-only.
    ///
    /// The paired transfer is reversed (recipient back to sender, with
    /// linked reversal entries) in the same transaction that removes the
    /// row, so balances and ledger history stay consistent. Deletion fails
    /// with [`Error::InsufficientBalance`] when the recipient has already
    /// spent the points.
    pub async fn delete(&self, id: &str, caller_id: &str) -> Result<()> {
        let mut tx = self.store.begin().await?;

        let recognition = tx
            .recognition_for_update(id)
            .await?
            .ok_or(Error::RecognitionNotFound)?;
        if recognition.sender_id != caller_id {
            return Err(Error::NotOwner);
        }

        ops::transfer_in_tx(
            tx.as_mut(),
            &recognition.recipient_id,
            &recognition.sender_id,
            recognition.points_amount,
            &format!("Recognition removed: {}", recognition.message),
            Some(id),
        )
        .await?;

        tx.delete_recognition(id).await?;
        tx.commit().await?;
        info!(recognition = %id, "recognition deleted and transfer reversed");
        Ok(())
    }

    async fn page(
        &self,
        filter: &RecognitionFilter,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<RecognitionPage> {
        let limit = limit.unwrap_or(DEFAULT_FEED_LIMIT);
        let recognitions = self.store.list_recognitions(filter, limit, offset).await?;
        let total_count = self.store.count_recognitions(filter).await?;
        Ok(RecognitionPage {
            recognitions,
            total_count,
            has_more: offset + limit < total_count,
        })
    }
}
