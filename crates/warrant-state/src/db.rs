//! # Database Bootstrap
//!
//! Opens the SQLite database and creates the schema idempotently. The
//! database is a single file surviving process restarts; WAL journaling
//! plus a busy timeout let concurrent verification requests on separate
//! pool connections serialize their writes instead of failing fast.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::error::StoreError;

/// Busy timeout for write contention between pool connections.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Schema statements, applied in order. All idempotent.
///
/// The `CHECK` clause on `licenses` backs the core invariant
/// `0 <= uses_consumed <= max_uses` at the engine level; the conditional
/// increment in `LicenseStore` is what upholds it under concurrency.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS licenses (
        id            TEXT PRIMARY KEY,
        key           TEXT NOT NULL UNIQUE,
        owner         TEXT NOT NULL DEFAULT '',
        uses_consumed INTEGER NOT NULL DEFAULT 0,
        max_uses      INTEGER NOT NULL,
        expires_at    TEXT,
        revoked       INTEGER NOT NULL DEFAULT 0,
        created_at    TEXT NOT NULL,
        CHECK (uses_consumed >= 0 AND uses_consumed <= max_uses AND max_uses > 0)
    )",
    "CREATE TABLE IF NOT EXISTS activations (
        id              TEXT PRIMARY KEY,
        license_key     TEXT NOT NULL,
        client_identity TEXT NOT NULL,
        context         TEXT NOT NULL DEFAULT '',
        origin          TEXT NOT NULL DEFAULT '',
        time            TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_activations_time ON activations (time DESC)",
    "CREATE INDEX IF NOT EXISTS idx_activations_license_key ON activations (license_key)",
];

/// Open (creating if missing) the database at `path` and ensure the
/// schema exists.
pub async fn open(path: impl AsRef<Path>) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

/// Apply the schema to an existing pool. Idempotent.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
