//! The HTTP client every backend call goes through.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

pub use reqwest::Method;

use crate::notify::{Notification, Notifier};
use crate::{GatewayError, MultipartForm};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Configuration
// =============================================================================

/// Connection settings for [`ApiClient`].
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Backend base URL; request paths are appended to it.
    pub base_url: Url,
    /// Bearer token sent with every request, if any.
    pub token: Option<SecretString>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

// =============================================================================
// Request body
// =============================================================================

/// Body of a backend request.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

impl RequestBody {
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the commerce backend.
///
/// Cheap to clone. Failed calls are reported to the configured
/// [`Notifier`] before the error is returned.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticated", &self.inner.token.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("circuit-bazaar/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.clone(),
                token: config.token.clone(),
                notifier,
            }),
        })
    }

    /// A client sharing this one's connection pool but sending `token`.
    #[must_use]
    pub fn with_token(&self, token: SecretString) -> Self {
        self.rebuild(Some(token))
    }

    /// A client sharing this one's connection pool without a token.
    #[must_use]
    pub fn without_token(&self) -> Self {
        self.rebuild(None)
    }

    fn rebuild(&self, token: Option<SecretString>) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http: self.inner.http.clone(),
                base_url: self.inner.base_url.clone(),
                token,
                notifier: Arc::clone(&self.inner.notifier),
            }),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner.token.is_some()
    }

    /// Send a request and decode the whole response body as `T`.
    ///
    /// An empty success body decodes as JSON `null`, so `T = ()` works for
    /// endpoints answering 204.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`GatewayError`] on transport failure, non-2xx
    /// status, or a body that does not decode as `T`. The error is reported
    /// to the notifier first.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        method: Method,
        body: RequestBody,
    ) -> Result<T, GatewayError> {
        self.request_with_query(path, method, &[], body).await
    }

    /// [`request`](Self::request) with query-string pairs.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    #[instrument(skip(self, query, body), fields(method = %method, multipart = body.is_multipart()))]
    pub async fn request_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        method: Method,
        query: &[(String, String)],
        body: RequestBody,
    ) -> Result<T, GatewayError> {
        match self.execute(path, method, query, body).await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.inner
                    .notifier
                    .notify(Notification::from_error(path, &err));
                Err(err)
            }
        }
    }

    /// Check that the backend answers at all. Any HTTP status counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    pub async fn ping(&self) -> Result<(), GatewayError> {
        self.inner
            .http
            .head(self.inner.base_url.clone())
            .send()
            .await?;
        Ok(())
    }

    fn url(&self, path: &str, query: &[(String, String)]) -> Result<Url, GatewayError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let mut url = Url::parse(&format!("{base}/{path}"))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        method: Method,
        query: &[(String, String)],
        body: RequestBody,
    ) -> Result<T, GatewayError> {
        let url = self.url(path, query)?;
        let mut builder = self.inner.http.request(method, url);

        if let Some(token) = &self.inner.token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form.into_reqwest()?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path = %path,
                body = %text.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(GatewayError::from_response(status.as_u16(), &text));
        }

        let raw = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(raw).map_err(|source| {
            tracing::error!(
                error = %source,
                path = %path,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to decode backend response"
            );
            GatewayError::Decode {
                path: path.to_string(),
                source,
            }
        })
        .inspect(|_| debug!(status = %status, "Backend call succeeded"))
    }
}
