//! # Client Verification Endpoint
//!
//! `POST /api/verify` is the one route third-party clients call. The
//! shared-secret header is checked before any license logic runs — a
//! mismatch never touches the store, appends no activation, and changes
//! no counter. Past that gate the endpoint always answers with a
//! well-formed `{valid, message}` body: entitlement denials are soft
//! results, not protocol failures. Only a storage-layer error surfaces
//! as a 500.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the shared client secret.
pub const API_SECRET_HEADER: &str = "x-api-secret";

/// Verification request body.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// The license key being presented.
    pub license: Option<String>,
    /// Identity of the presenting client.
    pub username: Option<String>,
    /// Application context, e.g. a game id.
    #[serde(default, rename = "gameId")]
    pub game_id: Option<String>,
}

/// Verification response body; identical shape for every outcome.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    /// Whether a use slot was consumed.
    pub valid: bool,
    /// Outcome description for the client.
    pub message: String,
}

fn reply(status: StatusCode, valid: bool, message: &str) -> Response {
    (
        status,
        Json(VerifyResponse {
            valid,
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Handle one verification attempt.
pub async fn verify(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<VerifyRequest>,
) -> Result<Response, AppError> {
    let presented = headers
        .get(API_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    if presented != Some(state.config.api_secret.as_str()) {
        return Ok(reply(StatusCode::UNAUTHORIZED, false, "Bad API secret"));
    }

    let (Some(license), Some(username)) = (request.license.as_deref(), request.username.as_deref())
    else {
        return Ok(reply(
            StatusCode::BAD_REQUEST,
            false,
            "license and username are required",
        ));
    };
    let context = request.game_id.as_deref().unwrap_or("");

    let outcome = state
        .lifecycle
        .verify(license, username, context, &addr.ip().to_string())
        .await
        .map_err(AppError::from)?;

    Ok(reply(StatusCode::OK, outcome.is_valid(), outcome.message()))
}
