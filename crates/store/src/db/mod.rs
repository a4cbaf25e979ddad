//! Database operations for the store core (SQLite).
//!
//! # Tables
//!
//! - `cart` - one row per customer, created lazily
//! - `cart_line` - strictly-positive quantities, keyed `(cart_id, item_id)`
//! - `customer_order` - the order ledger
//! - `order_line` - write-once price/name snapshots
//!
//! Monetary amounts are stored as TEXT and parsed into `Decimal` at this
//! boundary; nothing above `db/` touches raw rows.
//!
//! # Migrations
//!
//! Migrations live in `crates/store/migrations/` and are embedded via
//! [`MIGRATOR`]; run them with `MIGRATOR.run(&pool)` at startup.

pub mod carts;
pub mod orders;

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Concurrent modification detected (e.g., a cart changed mid-checkout).
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Create a SQLite connection pool with sensible defaults.
///
/// WAL journal mode, a busy timeout, and enforced foreign keys; the
/// database file is created if missing.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Parse a TEXT-stored monetary amount, surfacing bad rows as corruption.
pub(crate) fn parse_amount(raw: &str, what: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {what} in database: {e}")))
}
