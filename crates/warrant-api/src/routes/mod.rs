//! # Route Modules
//!
//! `verify` carries the client-facing verification endpoint; `admin`
//! carries the authenticated administration surface and the embedded
//! dashboard. [`app`] assembles both into the application router.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::state::AppState;

pub mod admin;
pub mod verify;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/admin/licenses", get(admin::list_licenses))
        .route("/admin/licenses/generate", post(admin::generate))
        .route("/admin/licenses/revoke", post(admin::revoke))
        .route("/admin/activations", get(admin::recent_activations))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new()
        .route("/api/verify", post(verify::verify))
        .route("/admin/login", post(admin::login))
        .route("/admin", get(admin::dashboard))
        .route("/healthz", get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe; unauthenticated.
async fn health() -> &'static str {
    "ok"
}
