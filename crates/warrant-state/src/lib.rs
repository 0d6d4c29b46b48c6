//! # warrant-state — Durable License State
//!
//! The stateful core of the Warrant licensing authority, backed by SQLite
//! via SQLx:
//!
//! - **LicenseStore** (`licenses.rs`): durable keyed storage for license
//!   records. Enforces key uniqueness and exposes the atomic conditional
//!   increment that makes race-free verification possible.
//!
//! - **ActivationLog** (`activations.rs`): append-only record of
//!   successful verifications. No mutation or deletion operations exist.
//!
//! - **LicenseLifecycle** (`lifecycle.rs`): the state machine and
//!   verification/consumption protocol. The only component permitted to
//!   mutate use counters, and the sole writer of activations.
//!
//! - **Database bootstrap** (`db.rs`): pool construction and idempotent
//!   schema creation.
//!
//! ## Concurrency
//!
//! A license's remaining-use counter is a shared, mutable, finite
//! resource. The hot path is protected by a storage-layer conditional
//! update (`UPDATE … WHERE uses_consumed < max_uses`) rather than
//! application-level locking, so correctness holds across every
//! connection to the same database. See `licenses::LicenseStore::consume_use`.
//!
//! ## Crate Policy
//!
//! - All domain types come from `warrant-core`; this crate adds
//!   persistence and orchestration only.
//! - Storage errors are surfaced, never swallowed. The notification path
//!   is the single exception, and it lives in the caller's sink.

pub mod activations;
pub mod db;
pub mod error;
pub mod licenses;
pub mod lifecycle;

// ─── Store re-exports ───────────────────────────────────────────────

pub use activations::ActivationLog;
pub use licenses::LicenseStore;

// ─── Lifecycle re-exports ───────────────────────────────────────────

pub use lifecycle::{IssueBatch, LicenseLifecycle, NotificationSink};

// ─── Error re-exports ───────────────────────────────────────────────

pub use error::{LifecycleError, StoreError};
