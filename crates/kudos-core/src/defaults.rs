//! Default limits shared across the workspace.

/// Default number of ledger entries returned by a history query.
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Default page size for recognition listings.
pub const DEFAULT_FEED_LIMIT: i64 = 20;

/// Upper bound on the points attached to a single recognition.
pub const MAX_RECOGNITION_POINTS: i64 = 100;

/// Length of a redemption code.
pub const REDEMPTION_CODE_LEN: usize = 8;
