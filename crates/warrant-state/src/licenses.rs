//! # LicenseStore — Durable Keyed License Storage
//!
//! The sole source of truth for a license's counters and flags. Exposes:
//!
//! - insert with unique-constraint enforcement on `key` (conflicts are
//!   reported, never silently absorbed),
//! - point lookup by key,
//! - full listing ordered by creation time descending,
//! - the one-way revocation latch,
//! - and [`LicenseStore::consume_use`], the atomic conditional increment.
//!
//! `consume_use` is deliberately a single guarded `UPDATE`, not a
//! read-then-write pair: two simultaneous verifications racing for the
//! last remaining use slot hit the engine's write serialization, and the
//! guard re-evaluates against committed state, so exactly one of them
//! increments. Higher layers never need a lock around the counter.

use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::sqlite::SqlitePool;

use warrant_core::License;

use crate::error::StoreError;

/// Row shape of the `licenses` table; converted to the domain type at the
/// storage boundary.
#[derive(sqlx::FromRow)]
struct LicenseRow {
    id: String,
    key: String,
    owner: String,
    uses_consumed: i64,
    max_uses: i64,
    expires_at: Option<DateTime<Utc>>,
    revoked: bool,
    created_at: DateTime<Utc>,
}

impl From<LicenseRow> for License {
    fn from(row: LicenseRow) -> Self {
        Self {
            id: row.id,
            key: row.key,
            owner: row.owner,
            uses_consumed: row.uses_consumed,
            max_uses: row.max_uses,
            expires_at: row.expires_at,
            revoked: row.revoked,
            created_at: row.created_at,
        }
    }
}

/// Durable keyed storage for [`License`] records.
#[derive(Debug, Clone)]
pub struct LicenseStore {
    pool: SqlitePool,
}

impl LicenseStore {
    /// Wrap a connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a fully-formed license record.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`] if a license with the same key already
    /// exists; [`StoreError::Storage`] for engine failures.
    pub async fn insert(&self, license: &License) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO licenses
                (id, key, owner, uses_consumed, max_uses, expires_at, revoked, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&license.id)
        .bind(&license.key)
        .bind(&license.owner)
        .bind(license.uses_consumed)
        .bind(license.max_uses)
        .bind(license.expires_at)
        .bind(license.revoked)
        .bind(license.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if matches!(db.kind(), ErrorKind::UniqueViolation) => {
                Err(StoreError::Conflict {
                    key: license.key.clone(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Point lookup by key.
    pub async fn get(&self, key: &str) -> Result<Option<License>, StoreError> {
        let row = sqlx::query_as::<_, LicenseRow>("SELECT * FROM licenses WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(License::from))
    }

    /// All licenses, newest first.
    pub async fn list(&self) -> Result<Vec<License>, StoreError> {
        let rows =
            sqlx::query_as::<_, LicenseRow>("SELECT * FROM licenses ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(License::from).collect())
    }

    /// Latch `revoked` to `true`. Idempotent: revoking an already-revoked
    /// license is a successful no-op.
    ///
    /// Returns `false` iff no license has the key.
    pub async fn revoke(&self, key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE licenses SET revoked = 1 WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The atomic check-and-increment primitive: consume one use slot iff
    /// the license is currently consumable.
    ///
    /// The guard re-checks revocation, expiry (against `now`), and
    /// remaining uses inside the same statement that increments, so no
    /// two increments can both observe the same pre-increment value.
    /// Returns `true` iff a slot was consumed.
    ///
    /// Takes any executor so callers can run it inside a transaction
    /// together with the activation append.
    pub async fn consume_use<'e, E>(
        executor: E,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE licenses
                SET uses_consumed = uses_consumed + 1
              WHERE key = ?1
                AND revoked = 0
                AND uses_consumed < max_uses
                AND (expires_at IS NULL OR expires_at > ?2)",
        )
        .bind(key)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
