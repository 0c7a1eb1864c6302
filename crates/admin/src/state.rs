//! Application state shared across handlers.

use std::sync::Arc;

use circuit_bazaar_gateway::{ApiClient, GatewayError, Notifier};

use crate::config::AdminConfig;
use crate::models::AdminSession;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    client: ApiClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built.
    pub fn new(config: AdminConfig, notifier: Arc<dyn Notifier>) -> Result<Self, GatewayError> {
        let client = ApiClient::new(&config.client_config(), notifier)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, client }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Backend client without credentials, used for login.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    /// Backend client acting as the signed-in admin.
    #[must_use]
    pub fn client_for(&self, admin: &AdminSession) -> ApiClient {
        self.inner.client.with_token(admin.token())
    }
}
