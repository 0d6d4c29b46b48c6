//! # Storage and Lifecycle Errors
//!
//! Two layers of failure:
//!
//! - `StoreError` — the durability layer: uniqueness conflicts on insert
//!   and underlying engine failures. Verification denials are *not* errors
//!   (they are [`warrant_core::VerifyOutcome`] values); only genuine
//!   storage trouble surfaces here.
//!
//! - `LifecycleError` — the lifecycle core: unknown keys on administrative
//!   operations, invalid issuance requests, and propagated store failures.

use thiserror::Error;

/// Error from the durable storage layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint was violated on insert.
    #[error("duplicate license key: {key}")]
    Conflict {
        /// The key that collided.
        key: String,
    },

    /// The underlying storage engine failed.
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

impl StoreError {
    /// Whether this is a uniqueness conflict (retryable by regenerating
    /// the key) as opposed to an engine failure.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Error from lifecycle operations.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// The referenced license key has never existed.
    #[error("license not found: {key}")]
    NotFound {
        /// The unknown key.
        key: String,
    },

    /// The request parameters were rejected before touching storage.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A storage-layer failure propagated unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for LifecycleError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store(StoreError::Storage(err))
    }
}
