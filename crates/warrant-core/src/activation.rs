//! # Activation Records
//!
//! An activation is the immutable record of one successful verification:
//! who presented which key, from where, in what context, and when. The
//! log is append-only — activations are historical facts and are never
//! mutated or deleted by the core, even after the referenced license is
//! revoked.
//!
//! The `license_key` field is a by-value reference, deliberately not an
//! enforced foreign key: the audit trail must survive whatever happens to
//! the license row it describes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One successful verification event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activation {
    /// Unique identifier of this event.
    pub id: String,
    /// Key of the license that was consumed (by value, not ownership).
    pub license_key: String,
    /// Identity the client presented (e.g., a username).
    pub client_identity: String,
    /// Application context of the verification (e.g., a game id).
    pub context: String,
    /// Caller address as observed by the authority.
    pub origin: String,
    /// When the verification succeeded.
    pub time: DateTime<Utc>,
}

impl Activation {
    /// Record a new activation stamped with the current time.
    pub fn record(
        license_key: impl Into<String>,
        client_identity: impl Into<String>,
        context: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            license_key: license_key.into(),
            client_identity: client_identity.into(),
            context: context.into(),
            origin: origin.into(),
            time: Utc::now(),
        }
    }
}
