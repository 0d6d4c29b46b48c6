//! # Admin Session Authentication
//!
//! Exchanges the configured credential pair for an opaque bearer token
//! whose possession alone grants admin access for a bounded window.
//! Tokens are 256-bit values from the OS random source, tracked
//! server-side with their expiry; validation purges expired sessions
//! lazily. Every admin route passes through [`require_admin`] before any
//! license logic runs.

use std::collections::HashMap;
use std::sync::Mutex;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::config::ServiceConfig;
use crate::error::AppError;
use crate::state::AppState;

/// A freshly issued session token and its expiry instant.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The opaque bearer credential.
    pub token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates time-limited admin session tokens.
pub struct AdminSessions {
    username: String,
    password: String,
    ttl: Duration,
    tokens: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl AdminSessions {
    /// Build the session authority from the service configuration.
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            username: config.admin_username.clone(),
            password: config.admin_password.clone(),
            ttl: config.session_ttl,
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Exchange the credential pair for a fresh token, or `None` when the
    /// credentials do not match.
    pub fn login(&self, username: &str, password: &str) -> Option<IssuedToken> {
        if username != self.username || password != self.password {
            return None;
        }
        let token = mint_token();
        let expires_at = Utc::now() + self.ttl;
        self.lock_tokens().insert(token.clone(), expires_at);
        Some(IssuedToken { token, expires_at })
    }

    /// Whether the `Authorization` header value carries a live session
    /// token. Expired sessions encountered on the way are dropped.
    pub fn authorize(&self, authorization: Option<&str>) -> bool {
        let Some(token) = authorization.and_then(|h| h.strip_prefix("Bearer ")) else {
            return false;
        };
        let now = Utc::now();
        let mut tokens = self.lock_tokens();
        tokens.retain(|_, expires_at| *expires_at > now);
        tokens.contains_key(token)
    }

    fn lock_tokens(&self) -> std::sync::MutexGuard<'_, HashMap<String, DateTime<Utc>>> {
        // A poisoned lock only means a panic elsewhere; the map itself
        // stays usable.
        self.tokens.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// 32 bytes from the OS random source, hex-encoded.
fn mint_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Middleware guarding the admin surface: rejects requests without a
/// live bearer token before they reach any handler.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if state.sessions.authorize(authorization) {
        Ok(next.run(request).await)
    } else {
        Err(AppError::Unauthorized(
            "missing or expired admin token".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sessions() -> AdminSessions {
        AdminSessions::new(&ServiceConfig::new("secret", "admin", "hunter2"))
    }

    #[test]
    fn test_login_accepts_configured_credentials() {
        let sessions = sessions();
        let issued = sessions.login("admin", "hunter2").expect("login succeeds");
        assert_eq!(issued.token.len(), 64);
        assert!(issued.expires_at > Utc::now());
    }

    #[test]
    fn test_login_rejects_wrong_credentials() {
        let sessions = sessions();
        assert!(sessions.login("admin", "wrong").is_none());
        assert!(sessions.login("root", "hunter2").is_none());
    }

    #[test]
    fn test_authorize_accepts_live_token() {
        let sessions = sessions();
        let issued = sessions.login("admin", "hunter2").unwrap();
        assert!(sessions.authorize(Some(&format!("Bearer {}", issued.token))));
    }

    #[test]
    fn test_authorize_rejects_garbage() {
        let sessions = sessions();
        assert!(!sessions.authorize(None));
        assert!(!sessions.authorize(Some("Bearer bogus")));
        assert!(!sessions.authorize(Some("bogus-without-scheme")));
    }

    #[test]
    fn test_authorize_rejects_expired_token() {
        let mut config = ServiceConfig::new("secret", "admin", "hunter2");
        config.session_ttl = Duration::seconds(-1);
        let sessions = AdminSessions::new(&config);
        let issued = sessions.login("admin", "hunter2").unwrap();
        assert!(!sessions.authorize(Some(&format!("Bearer {}", issued.token))));
    }

    #[test]
    fn test_tokens_are_unique_per_login() {
        let sessions = sessions();
        let a = sessions.login("admin", "hunter2").unwrap();
        let b = sessions.login("admin", "hunter2").unwrap();
        assert_ne!(a.token, b.token);
    }
}
