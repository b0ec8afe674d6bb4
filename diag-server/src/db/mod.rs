//! Database access layer
//!
//! SQLite pool setup plus one query module per aggregate. Query functions
//! take `&SqlitePool` (or a transaction via `&mut SqliteConnection`) and
//! return `sqlx::Error`; business rules live in `services` and `api`.

pub mod catalog;
pub mod invitations;
pub mod labs;
pub mod orders;
pub mod patients;
pub mod seed;
pub mod sessions;
pub mod stats;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Open the pool (WAL, foreign keys on) and apply migrations
pub async fn connect(database_url: &str) -> Result<SqlitePool, BoxError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| format!("Invalid DATABASE_URL: {e}"))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| format!("Failed to open database: {e}"))?;

    tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| format!("Failed to apply migrations: {e}"))?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

/// Fresh migrated in-memory database.
///
/// A single connection that never expires: every connection to
/// `sqlite::memory:` is a separate database.
pub async fn connect_in_memory() -> Result<SqlitePool, BoxError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
