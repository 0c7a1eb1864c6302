//! Backend connection settings, read from the environment.

use std::time::Duration;

use circuit_bazaar_gateway::ClientConfig;
use secrecy::SecretString;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Build the gateway client configuration from `BACKEND_URL`,
/// `BACKEND_API_TOKEN` and `BACKEND_TIMEOUT_SECS`.
///
/// # Errors
///
/// Returns an error if `BACKEND_URL` is missing or a value does not parse.
pub fn from_env() -> Result<ClientConfig, ConfigError> {
    from_lookup(|key| std::env::var(key).ok())
}

pub(crate) fn from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, ConfigError> {
    let raw_url = lookup("BACKEND_URL")
        .ok_or_else(|| ConfigError::MissingEnvVar("BACKEND_URL".to_string()))?;
    let base_url = Url::parse(&raw_url)
        .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), e.to_string()))?;

    let timeout = match lookup("BACKEND_TIMEOUT_SECS") {
        Some(raw) => raw.parse::<u64>().map_err(|e| {
            ConfigError::InvalidEnvVar("BACKEND_TIMEOUT_SECS".to_string(), e.to_string())
        })?,
        None => DEFAULT_TIMEOUT_SECS,
    };

    let config = ClientConfig::new(base_url).with_timeout(Duration::from_secs(timeout));
    Ok(match lookup("BACKEND_API_TOKEN").filter(|token| !token.is_empty()) {
        Some(token) => config.with_token(SecretString::from(token)),
        None => config,
    })
}
