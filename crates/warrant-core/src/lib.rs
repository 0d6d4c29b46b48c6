//! # warrant-core — Foundational Types
//!
//! Domain types shared across the Warrant licensing authority:
//!
//! - **License** (`license.rs`): the durable license record with its
//!   derived validity predicates (`Expired` and `Exhausted` are computed
//!   from `expires_at` / `uses_consumed`, never stored as flags — `revoked`
//!   is the only persisted boolean, a one-way administrative latch).
//!
//! - **Verification outcomes** (`license.rs`): `VerifyOutcome` and
//!   `VerifyDenial`, the soft-result vocabulary of the verification
//!   protocol. A denial is an answer, not an error — callers always
//!   receive a well-formed outcome distinguishing why a client is not
//!   entitled.
//!
//! - **Activation** (`activation.rs`): the append-only record of one
//!   successful verification. Activations reference licenses by key value,
//!   not by enforced foreign key — they are historical facts that outlive
//!   revocation.
//!
//! - **KeyIssuer** (`keygen.rs`): generation of fresh license keys from a
//!   cryptographically strong random source.
//!
//! ## Crate Policy
//!
//! - No I/O and no database access — pure types and logic.
//! - Sits at the bottom of the dependency DAG.

pub mod activation;
pub mod keygen;
pub mod license;

// ─── License re-exports ─────────────────────────────────────────────

pub use license::{License, VerifyDenial, VerifyOutcome};

// ─── Activation re-exports ──────────────────────────────────────────

pub use activation::Activation;

// ─── Key issuer re-exports ──────────────────────────────────────────

pub use keygen::{KeyIssuer, KEY_ALPHABET};
