//! # License Records and Verification Outcomes
//!
//! A license is a bearer credential entitling bounded, trackable use of a
//! client application. Its lifetime is governed by three independent
//! termination conditions:
//!
//! ```text
//! Active ──▶ Exhausted   (uses_consumed reaches max_uses — derived)
//!       ──▶ Expired     (expires_at passes — derived)
//!       ──▶ Revoked     (administrative latch — persisted, one-way)
//! ```
//!
//! `Exhausted` and `Expired` are **derived predicates** computed at
//! verification time from the counters and timestamps. They are never
//! persisted, so there is no second source of truth that could drift from
//! `uses_consumed` / `expires_at`, and an administrator raising `max_uses`
//! on an apparently-exhausted license simply makes it valid again.
//! `revoked` is the only stored boolean because it records an explicit
//! administrative action rather than a time or count derivation.
//!
//! ## Invariant
//!
//! `0 <= uses_consumed <= max_uses` holds at all times, including under
//! concurrent verification. The storage layer enforces this with an atomic
//! conditional increment; the types here only expose the predicates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── License ────────────────────────────────────────────────────────

/// A license record: the unit of entitlement tracked by the authority.
///
/// The `key` is the public handle clients present; `id` is an internal
/// immutable identifier. Records are never physically deleted — a license
/// terminates logically by exhaustion, expiry, or revocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    /// Internal unique identifier, immutable after creation.
    pub id: String,
    /// Unique human-presentable credential string.
    pub key: String,
    /// Free-text owner label, informational only.
    pub owner: String,
    /// Number of successful verifications consumed so far.
    /// Monotonically non-decreasing; mutated only by the lifecycle core.
    pub uses_consumed: i64,
    /// Ceiling on `uses_consumed`. Always positive. May be raised later by
    /// an administrative collaborator.
    pub max_uses: i64,
    /// Expiry instant; `None` means the license never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// One-way administrative latch; once `true` it never reverts.
    pub revoked: bool,
    /// Creation instant, immutable.
    pub created_at: DateTime<Utc>,
}

impl License {
    /// Create a fresh license with zero consumed uses.
    ///
    /// `max_uses` is the caller's responsibility to validate as positive;
    /// the lifecycle layer rejects non-positive values before reaching here.
    pub fn issue(
        key: String,
        owner: String,
        max_uses: i64,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            key,
            owner,
            uses_consumed: 0,
            max_uses,
            expires_at,
            revoked: false,
            created_at: Utc::now(),
        }
    }

    /// Whether the expiry instant is set and has passed, evaluated against
    /// the authority's own clock (`now`), never client-supplied time.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(exp) if exp <= now)
    }

    /// Whether every use slot has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.uses_consumed >= self.max_uses
    }

    /// Use slots still available.
    pub fn remaining_uses(&self) -> i64 {
        (self.max_uses - self.uses_consumed).max(0)
    }

    /// Evaluate the fail-closed denial checks in order: revocation, then
    /// expiry, then exhaustion. `None` means the license is consumable.
    pub fn deny_reason(&self, now: DateTime<Utc>) -> Option<VerifyDenial> {
        if self.revoked {
            Some(VerifyDenial::Revoked)
        } else if self.is_expired(now) {
            Some(VerifyDenial::Expired)
        } else if self.is_exhausted() {
            Some(VerifyDenial::ExhaustedUses)
        } else {
            None
        }
    }
}

// ─── Verification outcomes ──────────────────────────────────────────

/// Why a verification attempt was denied.
///
/// Denials are soft results, not errors: the verification protocol always
/// answers with a well-formed outcome so the caller can distinguish the
/// "not entitled" reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerifyDenial {
    /// No license has the presented key.
    NotFound,
    /// The license was administratively revoked.
    Revoked,
    /// The license's expiry instant has passed.
    Expired,
    /// Every use slot has been consumed.
    ExhaustedUses,
}

impl VerifyDenial {
    /// Human-readable message reported to the verifying client.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotFound => "License not found",
            Self::Revoked => "License revoked",
            Self::Expired => "License expired",
            Self::ExhaustedUses => "License uses exceeded",
        }
    }
}

impl std::fmt::Display for VerifyDenial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of one verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyOutcome {
    /// The license was valid; exactly one use slot was consumed and one
    /// activation recorded.
    Valid,
    /// The license was not consumable for the contained reason.
    Denied(VerifyDenial),
}

impl VerifyOutcome {
    /// Whether the attempt consumed a use slot.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Message reported to the verifying client.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Valid => "OK",
            Self::Denied(denial) => denial.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fresh(max_uses: i64) -> License {
        License::issue("TEST-KEY".to_string(), "owner".to_string(), max_uses, None)
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn test_issue_starts_unconsumed() {
        let lic = fresh(3);
        assert_eq!(lic.uses_consumed, 0);
        assert_eq!(lic.max_uses, 3);
        assert!(!lic.revoked);
        assert!(lic.expires_at.is_none());
        assert_eq!(lic.remaining_uses(), 3);
    }

    #[test]
    fn test_issue_ids_are_unique() {
        let a = fresh(1);
        let b = fresh(1);
        assert_ne!(a.id, b.id);
    }

    // ── Derived predicates ───────────────────────────────────────────

    #[test]
    fn test_exhaustion_is_derived_from_counters() {
        let mut lic = fresh(2);
        assert!(!lic.is_exhausted());
        lic.uses_consumed = 2;
        assert!(lic.is_exhausted());
        assert_eq!(lic.remaining_uses(), 0);
        // Raising the ceiling makes the license consumable again — no
        // stored flag to un-set.
        lic.max_uses = 5;
        assert!(!lic.is_exhausted());
        assert_eq!(lic.remaining_uses(), 3);
    }

    #[test]
    fn test_no_expiry_never_expires() {
        let lic = fresh(1);
        assert!(!lic.is_expired(Utc::now() + Duration::days(365 * 100)));
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let now = Utc::now();
        let mut lic = fresh(1);
        lic.expires_at = Some(now - Duration::seconds(1));
        assert!(lic.is_expired(now));
    }

    #[test]
    fn test_future_expiry_is_not_expired() {
        let now = Utc::now();
        let mut lic = fresh(1);
        lic.expires_at = Some(now + Duration::days(30));
        assert!(!lic.is_expired(now));
    }

    // ── Denial ordering ──────────────────────────────────────────────

    #[test]
    fn test_deny_reason_none_when_consumable() {
        let lic = fresh(1);
        assert_eq!(lic.deny_reason(Utc::now()), None);
    }

    #[test]
    fn test_revocation_wins_over_expiry_and_exhaustion() {
        let now = Utc::now();
        let mut lic = fresh(1);
        lic.revoked = true;
        lic.uses_consumed = 1;
        lic.expires_at = Some(now - Duration::hours(1));
        assert_eq!(lic.deny_reason(now), Some(VerifyDenial::Revoked));
    }

    #[test]
    fn test_expiry_wins_over_exhaustion() {
        let now = Utc::now();
        let mut lic = fresh(1);
        lic.uses_consumed = 1;
        lic.expires_at = Some(now - Duration::hours(1));
        assert_eq!(lic.deny_reason(now), Some(VerifyDenial::Expired));
    }

    #[test]
    fn test_exhaustion_denial() {
        let mut lic = fresh(1);
        lic.uses_consumed = 1;
        assert_eq!(lic.deny_reason(Utc::now()), Some(VerifyDenial::ExhaustedUses));
    }

    // ── Outcomes ─────────────────────────────────────────────────────

    #[test]
    fn test_outcome_messages() {
        assert_eq!(VerifyOutcome::Valid.message(), "OK");
        assert!(VerifyOutcome::Valid.is_valid());
        let denied = VerifyOutcome::Denied(VerifyDenial::ExhaustedUses);
        assert_eq!(denied.message(), "License uses exceeded");
        assert!(!denied.is_valid());
    }

    #[test]
    fn test_denial_display_matches_message() {
        for denial in [
            VerifyDenial::NotFound,
            VerifyDenial::Revoked,
            VerifyDenial::Expired,
            VerifyDenial::ExhaustedUses,
        ] {
            assert_eq!(denial.to_string(), denial.message());
        }
    }

    // ── Serde ────────────────────────────────────────────────────────

    #[test]
    fn test_license_serializes_camel_case() {
        let lic = fresh(4);
        let json = serde_json::to_value(&lic).unwrap();
        assert_eq!(json["usesConsumed"], 0);
        assert_eq!(json["maxUses"], 4);
        assert_eq!(json["revoked"], false);
        assert!(json.get("uses_consumed").is_none());
    }

    #[test]
    fn test_license_serde_roundtrip() {
        let lic = fresh(2);
        let json = serde_json::to_string(&lic).unwrap();
        let parsed: License = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, lic);
    }
}
