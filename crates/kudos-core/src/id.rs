//! Identifier and code generation.

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::defaults::REDEMPTION_CODE_LEN;

/// Generate a fresh opaque entity id.
#[inline]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a redemption code: the first 8 hex characters of a v4 uuid,
/// uppercased. Uniqueness is enforced by the storage layer.
pub fn redemption_code() -> String {
    Uuid::new_v4().simple().to_string()[..REDEMPTION_CODE_LEN].to_uppercase()
}

/// Current unix timestamp in seconds.
#[inline]
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redemption_code_shape() {
        let code = redemption_code();
        assert_eq!(code.len(), REDEMPTION_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }
}
