//! # Administration Surface
//!
//! Login, license listing, batch issuance, revocation, and the recent
//! activation audit. Every route except `login` and the dashboard page
//! sits behind the bearer-token guard (`auth::require_admin`), wired in
//! the router assembly.

use axum::extract::{Query, State};
use axum::response::Html;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warrant_core::{Activation, License};
use warrant_state::IssueBatch;

use crate::error::AppError;
use crate::state::AppState;

/// Upper bound on one activation-audit page.
const MAX_ACTIVATION_LIMIT: i64 = 500;
/// Default activation-audit page size.
const DEFAULT_ACTIVATION_LIMIT: i64 = 100;

// ─── Login ──────────────────────────────────────────────────────────

/// Credential pair presented at login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Admin username.
    pub username: String,
    /// Admin password.
    pub password: String,
}

/// Issued session token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// The opaque bearer token for subsequent admin calls.
    pub token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

/// Exchange the configured credential pair for a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    state
        .sessions
        .login(&request.username, &request.password)
        .map(|issued| {
            Json(LoginResponse {
                token: issued.token,
                expires_at: issued.expires_at,
            })
        })
        .ok_or_else(|| AppError::Unauthorized("invalid credentials".to_string()))
}

// ─── Licenses ───────────────────────────────────────────────────────

/// All licenses, newest first.
#[derive(Debug, Serialize)]
pub struct LicenseListResponse {
    /// License records.
    pub licenses: Vec<License>,
}

/// List every license.
pub async fn list_licenses(
    State(state): State<AppState>,
) -> Result<Json<LicenseListResponse>, AppError> {
    let licenses = state.lifecycle.licenses().list().await?;
    Ok(Json(LicenseListResponse { licenses }))
}

/// Batch issuance request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Number of licenses to create.
    #[serde(default = "default_count")]
    pub count: u32,
    /// Optional key prefix.
    #[serde(default)]
    pub prefix: String,
    /// Use ceiling per license.
    #[serde(default = "default_max_uses")]
    pub max_uses: i64,
    /// Days until expiry; `0` means never.
    #[serde(default)]
    pub expires_in_days: i64,
    /// Informational owner label.
    #[serde(default)]
    pub owner: String,
}

fn default_count() -> u32 {
    1
}

fn default_max_uses() -> i64 {
    1
}

/// Keys created by one issuance request.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// Keys in creation order.
    pub created: Vec<String>,
}

/// Create a batch of fresh licenses.
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let created = state
        .lifecycle
        .issue_batch(&IssueBatch {
            count: request.count,
            prefix: request.prefix,
            max_uses: request.max_uses,
            owner: request.owner,
            expires_in_days: request.expires_in_days,
        })
        .await?;
    Ok(Json(GenerateResponse { created }))
}

/// Revocation request.
#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    /// Key of the license to revoke.
    pub key: String,
}

/// Revocation acknowledgement.
#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    /// The revoked key.
    pub key: String,
    /// Always `true`; revocation is idempotent.
    pub revoked: bool,
}

/// Latch a license as revoked. Repeating the call succeeds silently;
/// a key that never existed answers 404.
pub async fn revoke(
    State(state): State<AppState>,
    Json(request): Json<RevokeRequest>,
) -> Result<Json<RevokeResponse>, AppError> {
    state.lifecycle.revoke(&request.key).await?;
    Ok(Json(RevokeResponse {
        key: request.key,
        revoked: true,
    }))
}

// ─── Activations ────────────────────────────────────────────────────

/// Query parameters for the activation audit.
#[derive(Debug, Deserialize)]
pub struct ActivationsQuery {
    /// Page size; clamped to [1, 500].
    #[serde(default = "default_activation_limit")]
    pub limit: i64,
}

fn default_activation_limit() -> i64 {
    DEFAULT_ACTIVATION_LIMIT
}

/// Recent activations, newest first.
#[derive(Debug, Serialize)]
pub struct ActivationListResponse {
    /// Activation records.
    pub activations: Vec<Activation>,
}

/// Read the most recent activations.
pub async fn recent_activations(
    State(state): State<AppState>,
    Query(query): Query<ActivationsQuery>,
) -> Result<Json<ActivationListResponse>, AppError> {
    let limit = query.limit.clamp(1, MAX_ACTIVATION_LIMIT);
    let activations = state.lifecycle.activations().recent(limit).await?;
    Ok(Json(ActivationListResponse { activations }))
}

// ─── Dashboard ──────────────────────────────────────────────────────

/// Serve the embedded single-page admin dashboard.
pub async fn dashboard() -> Html<&'static str> {
    Html(include_str!("../../assets/dashboard.html"))
}
