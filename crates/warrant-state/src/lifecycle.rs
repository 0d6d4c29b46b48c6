//! # LicenseLifecycle — Verification and Consumption Protocol
//!
//! The only component permitted to mutate use counters or flags. Enforces
//! the license state machine:
//!
//! ```text
//! Active ──▶ Exhausted / Expired   (derived, computed at verify time)
//!       ──▶ Revoked               (persisted one-way latch)
//! ```
//!
//! ## Atomic Consume-on-Verify
//!
//! The central correctness property of the whole system: the counter
//! increment and the activation append are indivisible with respect to
//! concurrent `verify` calls on the same key. The implementation pairs
//! the storage-layer conditional increment with the activation insert in
//! one transaction — two calls racing for the last remaining use slot
//! resolve so exactly one commits; the loser re-reads the now-updated
//! state and reports exhaustion. A failure anywhere in the pair rolls the
//! whole pair back, so partial state (an increment without its audit
//! record, or vice versa) cannot exist.
//!
//! Per-key increments are strictly serialized by the engine's write lock:
//! no two increments observe the same pre-increment value.
//!
//! ## Notification
//!
//! Successful verification emits one best-effort event through the
//! configured [`NotificationSink`]. Delivery is fire-and-forget; it never
//! blocks or fails the verification response.

use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use warrant_core::keygen::DEFAULT_KEY_LENGTH;
use warrant_core::{Activation, KeyIssuer, License, VerifyDenial, VerifyOutcome};

use crate::activations::ActivationLog;
use crate::error::{LifecycleError, StoreError};
use crate::licenses::LicenseStore;

/// Attempts to regenerate a colliding key before giving up. With 80-bit
/// keys a single collision is already implausible; repeated collisions
/// indicate a broken random source, which deserves a surfaced error.
const KEY_RETRY_LIMIT: usize = 4;

/// Outbound event emission, implemented by the hosting service.
///
/// `deliver` must not block: implementations hand the event off (e.g. to a
/// spawned task) and swallow their own delivery failures. This boundary is
/// the only place in the system where an error may be dropped.
pub trait NotificationSink: Send + Sync {
    /// Emit one structured event, best-effort.
    fn deliver(&self, title: &str, description: &str);
}

/// Parameters for batch license issuance.
#[derive(Debug, Clone)]
pub struct IssueBatch {
    /// Number of licenses to create. Must be at least 1.
    pub count: u32,
    /// Optional key prefix (empty for none).
    pub prefix: String,
    /// Use ceiling per license. Must be positive; there is no implicit
    /// default beyond what the caller passes.
    pub max_uses: i64,
    /// Informational owner label applied to every license in the batch.
    pub owner: String,
    /// Days until expiry; `0` means the licenses never expire.
    pub expires_in_days: i64,
}

/// The license lifecycle core.
pub struct LicenseLifecycle {
    pool: SqlitePool,
    licenses: LicenseStore,
    activations: ActivationLog,
    issuer: KeyIssuer,
    notifier: Option<Arc<dyn NotificationSink>>,
}

impl LicenseLifecycle {
    /// Build the lifecycle core over an opened database pool.
    pub fn new(pool: SqlitePool) -> Self {
        let licenses = LicenseStore::new(pool.clone());
        let activations = ActivationLog::new(pool.clone());
        Self {
            pool,
            licenses,
            activations,
            issuer: KeyIssuer::new(),
            notifier: None,
        }
    }

    /// Attach a notification sink for successful verifications.
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// The underlying license store, for administrative reads.
    pub fn licenses(&self) -> &LicenseStore {
        &self.licenses
    }

    /// The underlying activation log, for administrative reads.
    pub fn activations(&self) -> &ActivationLog {
        &self.activations
    }

    /// Verify a presented key and, if valid, consume one use slot and
    /// record the activation.
    ///
    /// Fails closed: unknown, revoked, expired, and exhausted licenses are
    /// denied in that order of precedence. Denials are soft outcomes; only
    /// storage failures surface as errors, and those leave no partial
    /// state behind.
    pub async fn verify(
        &self,
        key: &str,
        client_identity: &str,
        context: &str,
        origin: &str,
    ) -> Result<VerifyOutcome, StoreError> {
        let now = Utc::now();

        let Some(license) = self.licenses.get(key).await? else {
            debug!(key, "verification denied: unknown key");
            return Ok(VerifyOutcome::Denied(VerifyDenial::NotFound));
        };
        if let Some(denial) = license.deny_reason(now) {
            debug!(key, %denial, "verification denied");
            return Ok(VerifyOutcome::Denied(denial));
        }

        // Consumable at first read. Now race for a slot: the guarded
        // increment and the audit append commit or roll back together.
        let mut tx = self.pool.begin().await?;
        let consumed = LicenseStore::consume_use(&mut *tx, key, now).await?;
        if !consumed {
            tx.rollback().await?;
            // Lost the race, or the state changed under us. Classify from
            // a fresh read of the committed state.
            let denial = match self.licenses.get(key).await? {
                None => VerifyDenial::NotFound,
                Some(l) => l.deny_reason(now).unwrap_or(VerifyDenial::ExhaustedUses),
            };
            debug!(key, %denial, "verification denied after contention");
            return Ok(VerifyOutcome::Denied(denial));
        }

        let activation = Activation::record(key, client_identity, context, origin);
        ActivationLog::append_with(&mut *tx, &activation).await?;
        tx.commit().await?;

        info!(key, client = client_identity, context, "license verified");
        if let Some(notifier) = &self.notifier {
            notifier.deliver(
                "License Verified",
                &format!("License: {key}\nUser: {client_identity}\nGame: {context}"),
            );
        }
        Ok(VerifyOutcome::Valid)
    }

    /// Latch a license as revoked. Idempotent: revoking twice succeeds
    /// silently. Errors with [`LifecycleError::NotFound`] only when the
    /// key has never existed.
    pub async fn revoke(&self, key: &str) -> Result<(), LifecycleError> {
        if self.licenses.revoke(key).await? {
            info!(key, "license revoked");
            Ok(())
        } else {
            Err(LifecycleError::NotFound { key: key.to_string() })
        }
    }

    /// Create a batch of fresh licenses, returning their keys in creation
    /// order.
    ///
    /// Each license is created atomically (one insert); a mid-batch
    /// failure leaves every earlier license fully created and no license
    /// half-created. Key collisions against existing rows are retried
    /// with a regenerated key.
    pub async fn issue_batch(&self, batch: &IssueBatch) -> Result<Vec<String>, LifecycleError> {
        if batch.count == 0 {
            return Err(LifecycleError::InvalidRequest(
                "count must be at least 1".to_string(),
            ));
        }
        if batch.max_uses <= 0 {
            return Err(LifecycleError::InvalidRequest(
                "maxUses must be a positive integer".to_string(),
            ));
        }
        if batch.expires_in_days < 0 {
            return Err(LifecycleError::InvalidRequest(
                "expiresInDays must not be negative".to_string(),
            ));
        }

        let expires_at =
            (batch.expires_in_days > 0).then(|| Utc::now() + Duration::days(batch.expires_in_days));

        let mut created = Vec::with_capacity(batch.count as usize);
        for _ in 0..batch.count {
            let key = self.insert_fresh(batch, expires_at).await?;
            created.push(key);
        }
        info!(
            count = created.len(),
            owner = %batch.owner,
            "issued license batch"
        );
        Ok(created)
    }

    /// Insert one new license, regenerating the key on a uniqueness
    /// conflict.
    async fn insert_fresh(
        &self,
        batch: &IssueBatch,
        expires_at: Option<chrono::DateTime<Utc>>,
    ) -> Result<String, LifecycleError> {
        let mut last_conflict = None;
        for _ in 0..KEY_RETRY_LIMIT {
            let key = self.issuer.generate(&batch.prefix, DEFAULT_KEY_LENGTH);
            let license =
                License::issue(key.clone(), batch.owner.clone(), batch.max_uses, expires_at);
            match self.licenses.insert(&license).await {
                Ok(()) => return Ok(key),
                Err(err @ StoreError::Conflict { .. }) => {
                    debug!(%key, "generated key collided, retrying");
                    last_conflict = Some(err);
                }
                Err(err) => return Err(err.into()),
            }
        }
        // Unreachable in practice; see KEY_RETRY_LIMIT.
        Err(last_conflict
            .map(LifecycleError::from)
            .unwrap_or_else(|| LifecycleError::InvalidRequest("key generation failed".to_string())))
    }
}
