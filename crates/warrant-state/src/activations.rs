//! # ActivationLog — Append-Only Verification Audit
//!
//! Every successful verification appends exactly one activation. The log
//! exposes append and bounded recent-first reads; there are no update or
//! delete operations, by construction. `append` fails only on storage
//! engine errors, which are surfaced to the caller.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;

use warrant_core::Activation;

use crate::error::StoreError;

/// Row shape of the `activations` table.
#[derive(sqlx::FromRow)]
struct ActivationRow {
    id: String,
    license_key: String,
    client_identity: String,
    context: String,
    origin: String,
    time: DateTime<Utc>,
}

impl From<ActivationRow> for Activation {
    fn from(row: ActivationRow) -> Self {
        Self {
            id: row.id,
            license_key: row.license_key,
            client_identity: row.client_identity,
            context: row.context,
            origin: row.origin,
            time: row.time,
        }
    }
}

/// Append-only store of [`Activation`] records.
#[derive(Debug, Clone)]
pub struct ActivationLog {
    pool: SqlitePool,
}

impl ActivationLog {
    /// Wrap a connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one activation.
    pub async fn append(&self, activation: &Activation) -> Result<(), StoreError> {
        Self::append_with(&self.pool, activation).await
    }

    /// Append one activation on an arbitrary executor, so the lifecycle
    /// core can pair it with the counter increment in one transaction.
    pub async fn append_with<'e, E>(executor: E, activation: &Activation) -> Result<(), StoreError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            "INSERT INTO activations (id, license_key, client_identity, context, origin, time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&activation.id)
        .bind(&activation.license_key)
        .bind(&activation.client_identity)
        .bind(&activation.context)
        .bind(&activation.origin)
        .bind(activation.time)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// The most recent `limit` activations, newest first.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Activation>, StoreError> {
        let rows = sqlx::query_as::<_, ActivationRow>(
            "SELECT * FROM activations ORDER BY time DESC, id LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Activation::from).collect())
    }

    /// Total number of recorded activations.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activations")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}
