//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::provider::ChatProvider;

/// State shared across all HTTP handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// User and token persistence.
    pub store: Arc<SqliteStore>,
    /// Upstream chat-completion provider.
    pub provider: Arc<dyn ChatProvider>,
    /// Verified against when a login names an unknown user.
    pub dummy_password_hash: String,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
