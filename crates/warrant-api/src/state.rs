//! # Application State
//!
//! Shared state handed to every route handler: the lifecycle core, the
//! admin session authority, and the service configuration.

use std::sync::Arc;

use sqlx::sqlite::SqlitePool;

use warrant_state::{LicenseLifecycle, NotificationSink};

use crate::auth::AdminSessions;
use crate::config::ServiceConfig;
use crate::notify::WebhookSink;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// The license lifecycle core; the only mutator of license state.
    pub lifecycle: Arc<LicenseLifecycle>,
    /// Admin session issuance and validation.
    pub sessions: Arc<AdminSessions>,
    /// The service configuration.
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    /// Assemble the application over an opened database pool. A
    /// configured webhook URL attaches the notification sink; its absence
    /// silently disables that path.
    pub fn new(pool: SqlitePool, config: ServiceConfig) -> Self {
        let mut lifecycle = LicenseLifecycle::new(pool);
        if let Some(url) = &config.webhook_url {
            let sink: Arc<dyn NotificationSink> = Arc::new(WebhookSink::new(url.clone()));
            lifecycle = lifecycle.with_notifier(sink);
        }
        Self {
            lifecycle: Arc::new(lifecycle),
            sessions: Arc::new(AdminSessions::new(&config)),
            config: Arc::new(config),
        }
    }
}
