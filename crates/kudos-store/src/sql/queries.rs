//! SQL text for the storage gateway.
//!
//! Statements are written with `?` placeholders and rewritten to `$n` for
//! PostgreSQL by [`for_db`]. Locked reads append `FOR UPDATE` where the
//! database supports it ([`locked`]); SQLite serializes writers on its own.

use std::borrow::Cow;

use super::DatabaseType;

/// Rewrite `?` placeholders into `$1..$n` for PostgreSQL.
pub fn for_db(db: DatabaseType, sql: &str) -> Cow<'_, str> {
    match db {
        DatabaseType::PostgreSQL => {
            let mut out = String::with_capacity(sql.len() + 8);
            let mut n = 0u32;
            for ch in sql.chars() {
                if ch == '?' {
                    n += 1;
                    out.push('$');
                    out.push_str(&n.to_string());
                } else {
                    out.push(ch);
                }
            }
            Cow::Owned(out)
        }
        DatabaseType::MySQL | DatabaseType::SQLite => Cow::Borrowed(sql),
    }
}

/// Row-locking suffix for `SELECT ... FOR UPDATE` reads.
pub fn lock_clause(db: DatabaseType) -> &'static str {
    match db {
        DatabaseType::PostgreSQL | DatabaseType::MySQL => " FOR UPDATE",
        DatabaseType::SQLite => "",
    }
}

/// A select statement with placeholders rewritten and a row lock appended.
pub fn locked(db: DatabaseType, sql: &str) -> String {
    format!("{}{}", for_db(db, sql), lock_clause(db))
}

// --- users ---

pub const USER_BY_ID: &str = "SELECT id, email, first_name, last_name, department, role, \
     points_balance, monthly_allocation, is_active, created_at, updated_at \
     FROM users WHERE id = ?";

pub const USER_BY_EMAIL: &str = "SELECT id, email, first_name, last_name, department, role, \
     points_balance, monthly_allocation, is_active, created_at, updated_at \
     FROM users WHERE email = ?";

pub const LIST_ACTIVE_USERS: &str = "SELECT id, email, first_name, last_name, department, role, \
     points_balance, monthly_allocation, is_active, created_at, updated_at \
     FROM users WHERE is_active = ? ORDER BY created_at, id";

pub const INSERT_USER: &str = "INSERT INTO users \
     (id, email, first_name, last_name, department, role, points_balance, \
      monthly_allocation, is_active, created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

pub const SET_USER_ACTIVE: &str =
    "UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?";

pub const SET_USER_ALLOCATION: &str =
    "UPDATE users SET monthly_allocation = ?, updated_at = ? WHERE id = ?";

pub const SET_USER_BALANCE: &str =
    "UPDATE users SET points_balance = ?, updated_at = ? WHERE id = ?";

// --- points transactions ---

pub const TRANSACTIONS_FOR_USER: &str =
    "SELECT id, user_id, kind, amount, description, related_id, created_at \
     FROM points_transactions WHERE user_id = ? ORDER BY seq DESC LIMIT ?";

pub const INSERT_TRANSACTION: &str = "INSERT INTO points_transactions \
     (id, user_id, kind, amount, description, related_id, created_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?)";

pub const COUNT_TRANSACTIONS: &str = "SELECT COUNT(*) AS n FROM points_transactions";

/// Active-balance total. `CAST` keeps the aggregate decodable as a signed
/// 64-bit integer on PostgreSQL (where `SUM(bigint)` is numeric).
pub const SUM_ACTIVE_BALANCES: &str =
    "SELECT CAST(COALESCE(SUM(points_balance), 0) AS BIGINT) AS total \
     FROM users WHERE is_active = ?";

/// MySQL spells the 64-bit cast `SIGNED`.
pub const SUM_ACTIVE_BALANCES_MYSQL: &str =
    "SELECT CAST(COALESCE(SUM(points_balance), 0) AS SIGNED) AS total \
     FROM users WHERE is_active = ?";

pub const STATS_BY_KIND: &str =
    "SELECT kind, COUNT(*) AS n, CAST(COALESCE(SUM(amount), 0) AS BIGINT) AS total \
     FROM points_transactions GROUP BY kind ORDER BY kind";

pub const STATS_BY_KIND_MYSQL: &str =
    "SELECT kind, COUNT(*) AS n, CAST(COALESCE(SUM(amount), 0) AS SIGNED) AS total \
     FROM points_transactions GROUP BY kind ORDER BY kind";

// --- rewards ---

pub const REWARD_BY_ID: &str = "SELECT id, title, description, points_cost, category, is_active, \
     stock_quantity, created_at, updated_at \
     FROM rewards WHERE id = ?";

pub const LIST_REWARDS_ALL: &str =
    "SELECT id, title, description, points_cost, category, is_active, \
     stock_quantity, created_at, updated_at \
     FROM rewards ORDER BY category, points_cost";

pub const LIST_REWARDS_ACTIVE: &str =
    "SELECT id, title, description, points_cost, category, is_active, \
     stock_quantity, created_at, updated_at \
     FROM rewards WHERE is_active = ? ORDER BY category, points_cost";

pub const INSERT_REWARD: &str = "INSERT INTO rewards \
     (id, title, description, points_cost, category, is_active, stock_quantity, \
      created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";

pub const UPDATE_REWARD: &str = "UPDATE rewards SET title = ?, description = ?, \
     points_cost = ?, category = ?, is_active = ?, stock_quantity = ?, updated_at = ? \
     WHERE id = ?";

pub const SET_REWARD_STOCK: &str =
    "UPDATE rewards SET stock_quantity = ?, updated_at = ? WHERE id = ?";

pub const DELETE_REWARD: &str = "DELETE FROM rewards WHERE id = ?";

pub const COUNT_REWARDS: &str = "SELECT COUNT(*) AS n FROM rewards";

pub const COUNT_ACTIVE_REWARDS: &str =
    "SELECT COUNT(*) AS n FROM rewards WHERE is_active = ?";

// --- redemptions ---

pub const REDEMPTION_BY_ID: &str =
    "SELECT id, user_id, reward_id, points_spent, status, redemption_code, \
     created_at, updated_at \
     FROM reward_redemptions WHERE id = ?";

pub const REDEMPTIONS_FOR_USER: &str =
    "SELECT id, user_id, reward_id, points_spent, status, redemption_code, \
     created_at, updated_at \
     FROM reward_redemptions WHERE user_id = ? ORDER BY seq DESC";

pub const LIST_REDEMPTIONS: &str =
    "SELECT id, user_id, reward_id, points_spent, status, redemption_code, \
     created_at, updated_at \
     FROM reward_redemptions ORDER BY seq DESC";

pub const INSERT_REDEMPTION: &str = "INSERT INTO reward_redemptions \
     (id, user_id, reward_id, points_spent, status, redemption_code, created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

pub const SET_REDEMPTION_STATUS: &str =
    "UPDATE reward_redemptions SET status = ?, updated_at = ? WHERE id = ?";

pub const COUNT_REDEMPTIONS: &str = "SELECT COUNT(*) AS n FROM reward_redemptions";

pub const COUNT_REDEMPTIONS_BY_STATUS: &str =
    "SELECT COUNT(*) AS n FROM reward_redemptions WHERE status = ?";

pub const COUNT_PENDING_FOR_REWARD: &str =
    "SELECT COUNT(*) AS n FROM reward_redemptions WHERE reward_id = ? AND status = ?";

// --- recognitions ---

pub const RECOGNITION_BY_ID: &str =
    "SELECT id, sender_id, recipient_id, message, points_amount, is_private, \
     created_at, updated_at \
     FROM recognitions WHERE id = ?";

pub const INSERT_RECOGNITION: &str = "INSERT INTO recognitions \
     (id, sender_id, recipient_id, message, points_amount, is_private, created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

pub const DELETE_RECOGNITION: &str = "DELETE FROM recognitions WHERE id = ?";

pub const SET_RECOGNITION_PRIVACY: &str =
    "UPDATE recognitions SET is_private = ?, updated_at = ? WHERE id = ?";

pub const LIST_RECOGNITIONS_PUBLIC: &str =
    "SELECT id, sender_id, recipient_id, message, points_amount, is_private, \
     created_at, updated_at \
     FROM recognitions WHERE is_private = ? ORDER BY seq DESC LIMIT ? OFFSET ?";

pub const LIST_RECOGNITIONS_SENT: &str =
    "SELECT id, sender_id, recipient_id, message, points_amount, is_private, \
     created_at, updated_at \
     FROM recognitions WHERE sender_id = ? ORDER BY seq DESC LIMIT ? OFFSET ?";

pub const LIST_RECOGNITIONS_RECEIVED: &str =
    "SELECT id, sender_id, recipient_id, message, points_amount, is_private, \
     created_at, updated_at \
     FROM recognitions WHERE recipient_id = ? ORDER BY seq DESC LIMIT ? OFFSET ?";

pub const LIST_RECOGNITIONS_INVOLVING: &str =
    "SELECT id, sender_id, recipient_id, message, points_amount, is_private, \
     created_at, updated_at \
     FROM recognitions WHERE sender_id = ? OR recipient_id = ? \
     ORDER BY seq DESC LIMIT ? OFFSET ?";

pub const COUNT_RECOGNITIONS_PUBLIC: &str =
    "SELECT COUNT(*) AS n FROM recognitions WHERE is_private = ?";

pub const COUNT_RECOGNITIONS_SENT: &str =
    "SELECT COUNT(*) AS n FROM recognitions WHERE sender_id = ?";

pub const COUNT_RECOGNITIONS_RECEIVED: &str =
    "SELECT COUNT(*) AS n FROM recognitions WHERE recipient_id = ?";

pub const COUNT_RECOGNITIONS_INVOLVING: &str =
    "SELECT COUNT(*) AS n FROM recognitions WHERE sender_id = ? OR recipient_id = ?";

// --- schema ---

const SCHEMA_SQLITE: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        department TEXT NOT NULL DEFAULT '',
        role TEXT NOT NULL DEFAULT 'EMPLOYEE',
        points_balance BIGINT NOT NULL DEFAULT 0,
        monthly_allocation BIGINT NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS points_transactions (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        user_id TEXT NOT NULL REFERENCES users(id),
        kind TEXT NOT NULL,
        amount BIGINT NOT NULL,
        description TEXT NOT NULL,
        related_id TEXT,
        created_at BIGINT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_transactions_user
        ON points_transactions (user_id, seq)",
    "CREATE TABLE IF NOT EXISTS rewards (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        points_cost BIGINT NOT NULL,
        category TEXT NOT NULL DEFAULT '',
        is_active INTEGER NOT NULL DEFAULT 1,
        stock_quantity BIGINT,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS reward_redemptions (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        user_id TEXT NOT NULL REFERENCES users(id),
        reward_id TEXT NOT NULL,
        points_spent BIGINT NOT NULL,
        status TEXT NOT NULL,
        redemption_code TEXT NOT NULL UNIQUE,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_redemptions_reward
        ON reward_redemptions (reward_id, status)",
    "CREATE TABLE IF NOT EXISTS recognitions (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        sender_id TEXT NOT NULL,
        recipient_id TEXT NOT NULL,
        message TEXT NOT NULL,
        points_amount BIGINT NOT NULL,
        is_private INTEGER NOT NULL DEFAULT 0,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_recognitions_sender
        ON recognitions (sender_id, seq)",
    "CREATE INDEX IF NOT EXISTS idx_recognitions_recipient
        ON recognitions (recipient_id, seq)",
];

const SCHEMA_POSTGRES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        department TEXT NOT NULL DEFAULT '',
        role TEXT NOT NULL DEFAULT 'EMPLOYEE',
        points_balance BIGINT NOT NULL DEFAULT 0,
        monthly_allocation BIGINT NOT NULL DEFAULT 0,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS points_transactions (
        seq BIGSERIAL PRIMARY KEY,
        id TEXT NOT NULL UNIQUE,
        user_id TEXT NOT NULL REFERENCES users(id),
        kind TEXT NOT NULL,
        amount BIGINT NOT NULL,
        description TEXT NOT NULL,
        related_id TEXT,
        created_at BIGINT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_transactions_user
        ON points_transactions (user_id, seq)",
    "CREATE TABLE IF NOT EXISTS rewards (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        points_cost BIGINT NOT NULL,
        category TEXT NOT NULL DEFAULT '',
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        stock_quantity BIGINT,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS reward_redemptions (
        seq BIGSERIAL PRIMARY KEY,
        id TEXT NOT NULL UNIQUE,
        user_id TEXT NOT NULL REFERENCES users(id),
        reward_id TEXT NOT NULL,
        points_spent BIGINT NOT NULL,
        status TEXT NOT NULL,
        redemption_code TEXT NOT NULL UNIQUE,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_redemptions_reward
        ON reward_redemptions (reward_id, status)",
    "CREATE TABLE IF NOT EXISTS recognitions (
        seq BIGSERIAL PRIMARY KEY,
        id TEXT NOT NULL UNIQUE,
        sender_id TEXT NOT NULL,
        recipient_id TEXT NOT NULL,
        message TEXT NOT NULL,
        points_amount BIGINT NOT NULL,
        is_private BOOLEAN NOT NULL DEFAULT FALSE,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_recognitions_sender
        ON recognitions (sender_id, seq)",
    "CREATE INDEX IF NOT EXISTS idx_recognitions_recipient
        ON recognitions (recipient_id, seq)",
];

// MySQL cannot index unsized TEXT columns and lacks CREATE INDEX IF NOT
// EXISTS, so ids get explicit lengths and indexes are declared inline.
const SCHEMA_MYSQL: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id VARCHAR(64) PRIMARY KEY,
        email VARCHAR(255) NOT NULL UNIQUE,
        first_name VARCHAR(255) NOT NULL,
        last_name VARCHAR(255) NOT NULL,
        department VARCHAR(255) NOT NULL DEFAULT '',
        role VARCHAR(32) NOT NULL DEFAULT 'EMPLOYEE',
        points_balance BIGINT NOT NULL DEFAULT 0,
        monthly_allocation BIGINT NOT NULL DEFAULT 0,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS points_transactions (
        seq BIGINT AUTO_INCREMENT PRIMARY KEY,
        id VARCHAR(64) NOT NULL UNIQUE,
        user_id VARCHAR(64) NOT NULL,
        kind VARCHAR(32) NOT NULL,
        amount BIGINT NOT NULL,
        description TEXT NOT NULL,
        related_id VARCHAR(64),
        created_at BIGINT NOT NULL,
        KEY idx_transactions_user (user_id, seq)
    )",
    "CREATE TABLE IF NOT EXISTS rewards (
        id VARCHAR(64) PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        description TEXT NOT NULL,
        points_cost BIGINT NOT NULL,
        category VARCHAR(255) NOT NULL DEFAULT '',
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        stock_quantity BIGINT,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS reward_redemptions (
        seq BIGINT AUTO_INCREMENT PRIMARY KEY,
        id VARCHAR(64) NOT NULL UNIQUE,
        user_id VARCHAR(64) NOT NULL,
        reward_id VARCHAR(64) NOT NULL,
        points_spent BIGINT NOT NULL,
        status VARCHAR(32) NOT NULL,
        redemption_code VARCHAR(16) NOT NULL UNIQUE,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL,
        KEY idx_redemptions_reward (reward_id, status)
    )",
    "CREATE TABLE IF NOT EXISTS recognitions (
        seq BIGINT AUTO_INCREMENT PRIMARY KEY,
        id VARCHAR(64) NOT NULL UNIQUE,
        sender_id VARCHAR(64) NOT NULL,
        recipient_id VARCHAR(64) NOT NULL,
        message TEXT NOT NULL,
        points_amount BIGINT NOT NULL,
        is_private BOOLEAN NOT NULL DEFAULT FALSE,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL,
        KEY idx_recognitions_sender (sender_id, seq),
        KEY idx_recognitions_recipient (recipient_id, seq)
    )",
];

/// DDL statements for the given database, in execution order.
pub fn schema(db: DatabaseType) -> &'static [&'static str] {
    match db {
        DatabaseType::SQLite => SCHEMA_SQLITE,
        DatabaseType::PostgreSQL => SCHEMA_POSTGRES,
        DatabaseType::MySQL => SCHEMA_MYSQL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_rewrite() {
        assert_eq!(
            for_db(DatabaseType::PostgreSQL, "UPDATE t SET a = ?, b = ? WHERE id = ?"),
            "UPDATE t SET a = $1, b = $2 WHERE id = $3"
        );
        assert_eq!(
            for_db(DatabaseType::SQLite, "SELECT * FROM t WHERE id = ?"),
            "SELECT * FROM t WHERE id = ?"
        );
    }

    #[test]
    fn test_lock_clause() {
        assert_eq!(
            locked(DatabaseType::PostgreSQL, USER_BY_ID),
            format!("{} FOR UPDATE", for_db(DatabaseType::PostgreSQL, USER_BY_ID))
        );
        assert_eq!(locked(DatabaseType::SQLite, USER_BY_ID), USER_BY_ID);
    }
}
