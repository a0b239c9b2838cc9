//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use pss_auth::AuthService;
use pss_core::config::AppConfig;
use pss_storage::StorageService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Credentials, sessions and accounts
    pub auth: Arc<AuthService>,
    /// Sandboxed filesystem
    pub storage: Arc<StorageService>,
}

impl AppState {
    /// Bundles the services for the router.
    pub fn new(config: AppConfig, auth: AuthService, storage: StorageService) -> Self {
        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            storage: Arc::new(storage),
        }
    }
}
