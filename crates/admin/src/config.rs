//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_BASE_URL` - Public URL for the admin API
//! - `BACKEND_URL` - Base URL of the commerce backend API
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `BACKEND_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `ADMIN_MAX_UPLOAD_MB` - Largest accepted request body (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! There is no backend token here: every admin call uses the token the
//! signed-in user obtained at login.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use circuit_bazaar_gateway::ClientConfig;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin API
    pub base_url: String,
    /// Base URL of the commerce backend
    pub backend_url: Url,
    /// Per-request backend timeout
    pub backend_timeout: Duration,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("backend_url", &self.backend_url.as_str())
            .field("backend_timeout", &self.backend_timeout)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));
        let parse_or = |key: &str, default: u64| -> Result<u64, ConfigError> {
            get(key).map_or(Ok(default), |value| {
                value
                    .trim()
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        ConfigError::InvalidEnvVar(key.to_string(), e.to_string())
                    })
            })
        };

        let host = get("ADMIN_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| {
                ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string())
            })?;
        let port = u16::try_from(parse_or("ADMIN_PORT", 3001)?).map_err(|e| {
            ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string())
        })?;
        let backend_url = Url::parse(&required("BACKEND_URL")?)
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), e.to_string()))?;
        let max_upload_mb = usize::try_from(parse_or("ADMIN_MAX_UPLOAD_MB", 10)?).map_err(|e| {
            ConfigError::InvalidEnvVar("ADMIN_MAX_UPLOAD_MB".to_string(), e.to_string())
        })?;

        Ok(Self {
            host,
            port,
            base_url: required("ADMIN_BASE_URL")?,
            backend_url,
            backend_timeout: Duration::from_secs(parse_or("BACKEND_TIMEOUT_SECS", 10)?),
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the admin API is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Gateway client settings, without a token.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.backend_url.clone()).with_timeout(self.backend_timeout)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AdminConfig, ConfigError> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        AdminConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("ADMIN_BASE_URL", "http://localhost:3001"),
            ("BACKEND_URL", "http://localhost:8080/api"),
        ])
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
        assert_eq!(config.backend_timeout, Duration::from_secs(10));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(!config.is_secure());
        assert!(config.client_config().token.is_none());
    }

    #[test]
    fn test_missing_and_invalid() {
        assert!(matches!(
            load(&[("ADMIN_BASE_URL", "http://localhost:3001")]).unwrap_err(),
            ConfigError::MissingEnvVar(ref key) if key == "BACKEND_URL"
        ));
        assert!(matches!(
            load(&[
                ("ADMIN_BASE_URL", "http://localhost:3001"),
                ("BACKEND_URL", "http://localhost:8080"),
                ("ADMIN_PORT", "70000"),
            ])
            .unwrap_err(),
            ConfigError::InvalidEnvVar(ref key, _) if key == "ADMIN_PORT"
        ));
        assert!(matches!(
            load(&[
                ("ADMIN_BASE_URL", "http://localhost:3001"),
                ("BACKEND_URL", "not a url"),
            ])
            .unwrap_err(),
            ConfigError::InvalidEnvVar(ref key, _) if key == "BACKEND_URL"
        ));
    }
}
