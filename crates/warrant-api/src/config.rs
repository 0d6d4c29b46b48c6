//! # Service Configuration
//!
//! All externally-supplied secrets and knobs in one explicit struct,
//! constructed once in the binary and passed down. Handlers and the
//! lifecycle core never read environment variables themselves, which
//! keeps them testable with plain constructed configs.

use chrono::Duration;

/// Configuration for the running service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Shared secret clients must present in the `x-api-secret` header.
    pub api_secret: String,
    /// Admin credential pair exchanged for a session token.
    pub admin_username: String,
    /// Admin password.
    pub admin_password: String,
    /// Outbound webhook target; `None` disables notifications entirely.
    pub webhook_url: Option<String>,
    /// Validity window of an issued admin session token.
    pub session_ttl: Duration,
}

impl ServiceConfig {
    /// Default admin session lifetime.
    pub const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

    /// Build a config with the given credentials and defaults elsewhere.
    pub fn new(
        api_secret: impl Into<String>,
        admin_username: impl Into<String>,
        admin_password: impl Into<String>,
    ) -> Self {
        Self {
            api_secret: api_secret.into(),
            admin_username: admin_username.into(),
            admin_password: admin_password.into(),
            webhook_url: None,
            session_ttl: Duration::hours(Self::DEFAULT_SESSION_TTL_HOURS),
        }
    }

    /// Read configuration from the environment, with development
    /// fallbacks for the credentials.
    ///
    /// Variables: `API_SECRET`, `ADMIN_USER`, `ADMIN_PASS`, `WEBHOOK_URL`.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            env_or("API_SECRET", "DEV_SECRET"),
            env_or("ADMIN_USER", "admin"),
            env_or("ADMIN_PASS", "password"),
        );
        config.webhook_url = std::env::var("WEBHOOK_URL").ok().filter(|u| !u.is_empty());
        config
    }

    /// Set the webhook target.
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
