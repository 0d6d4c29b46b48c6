//! # warrant-api — Axum HTTP Service
//!
//! The service layer of the Warrant licensing authority, built on
//! Axum/Tower/Tokio.
//!
//! ## Routes
//!
//! - `POST /api/verify` — client verification (shared-secret header);
//!   always answers with `{valid, message}` so callers can distinguish
//!   the "not entitled" reasons.
//! - `POST /admin/login` — exchanges the admin credential pair for a
//!   time-limited bearer token.
//! - `GET  /admin/licenses` — list all licenses, newest first.
//! - `POST /admin/licenses/generate` — batch issuance.
//! - `POST /admin/licenses/revoke` — one-way revocation by key.
//! - `GET  /admin/activations` — recent verification audit, bounded.
//! - `GET  /admin` — embedded single-page dashboard.
//! - `GET  /healthz` — unauthenticated liveness probe.
//!
//! ## Middleware Stack (Tower)
//!
//! TraceLayer → CorsLayer; admin routes additionally pass through the
//! bearer-token guard before any license logic runs.
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers — delegates to `warrant-state`.
//! - All errors map to structured HTTP responses via `AppError`;
//!   verification denials are soft results, never protocol failures.
//! - Configuration arrives as an explicit [`config::ServiceConfig`],
//!   never read from ambient process state inside handlers.

pub mod auth;
pub mod config;
pub mod error;
pub mod notify;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::AppError;
pub use routes::app;
pub use state::AppState;
