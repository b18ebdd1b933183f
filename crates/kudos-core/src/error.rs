//! Error taxonomy for the core engines.

use crate::defaults::MAX_RECOGNITION_POINTS;

/// Result alias used throughout the engine crates.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse error classification, used by calling layers to pick a response
/// and by metrics to tag failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-correctable validation failure.
    InvalidRequest,
    /// A referenced entity does not exist (or is not visible to the caller).
    NotFound,
    /// Ownership or visibility violation.
    Unauthorized,
    /// Storage-layer failure; the transaction was rolled back.
    Internal,
}

/// Engine error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Amount was zero or negative.
    #[error("points amount must be positive")]
    NonPositiveAmount,

    /// Recognition points above the per-recognition cap.
    #[error("points amount exceeds the maximum of {MAX_RECOGNITION_POINTS}")]
    AmountOverCap,

    /// Transfer with identical sender and recipient.
    #[error("cannot transfer points to yourself")]
    SelfTransfer,

    /// Recognition with identical sender and recipient.
    #[error("cannot send recognition to yourself")]
    SelfRecognition,

    /// Debit or transfer exceeding the sender's balance.
    #[error("insufficient points balance")]
    InsufficientBalance,

    /// User missing or deactivated.
    #[error("user not found")]
    UserNotFound,

    /// Reward missing.
    #[error("reward not found")]
    RewardNotFound,

    /// Reward exists but is not redeemable.
    #[error("reward is not active")]
    RewardInactive,

    /// Limited-stock reward with no stock left.
    #[error("reward is out of stock")]
    OutOfStock,

    /// Redemption missing.
    #[error("redemption not found")]
    RedemptionNotFound,

    /// Recognition missing.
    #[error("recognition not found")]
    RecognitionNotFound,

    /// Reward still referenced by a pending redemption.
    #[error("cannot delete reward with pending redemptions")]
    PendingRedemptions,

    /// Email already registered to another user.
    #[error("email already exists")]
    EmailTaken,

    /// Caller is not the sender of the recognition.
    #[error("you can only modify your own recognitions")]
    NotOwner,

    /// Private recognition viewed by a third party.
    #[error("you do not have permission to view this recognition")]
    PrivateRecognition,

    /// Residual validation failure.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// Storage-layer failure (database, pool, transaction).
    #[error("storage: {0}")]
    Storage(String),
}

impl Error {
    /// Create a residual validation error.
    #[inline]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Create a storage error from any error type.
    #[inline]
    pub fn storage<E: std::fmt::Display>(err: E) -> Self {
        Self::Storage(err.to_string())
    }

    /// Classify the error for response mapping and metrics.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NonPositiveAmount
            | Error::AmountOverCap
            | Error::SelfTransfer
            | Error::SelfRecognition
            | Error::InsufficientBalance
            | Error::RewardInactive
            | Error::OutOfStock
            | Error::PendingRedemptions
            | Error::EmailTaken
            | Error::Invalid(_) => ErrorKind::InvalidRequest,
            Error::UserNotFound
            | Error::RewardNotFound
            | Error::RedemptionNotFound
            | Error::RecognitionNotFound => ErrorKind::NotFound,
            Error::NotOwner | Error::PrivateRecognition => ErrorKind::Unauthorized,
            Error::Storage(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(Error::InsufficientBalance.kind(), ErrorKind::InvalidRequest);
        assert_eq!(Error::UserNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(Error::NotOwner.kind(), ErrorKind::Unauthorized);
        assert_eq!(Error::storage("pool timeout").kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_messages_are_caller_facing() {
        assert_eq!(
            Error::SelfTransfer.to_string(),
            "cannot transfer points to yourself"
        );
        assert_eq!(
            Error::InsufficientBalance.to_string(),
            "insufficient points balance"
        );
    }
}
