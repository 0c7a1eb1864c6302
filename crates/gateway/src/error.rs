//! Normalized gateway errors.

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by [`ApiClient`](crate::ApiClient).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection, timeout or body read failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Backend answered 401. Kept apart from other statuses so callers can
    /// drop stale credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Any other non-2xx answer.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// 2xx answer whose body did not match the expected shape.
    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// `{"message": "..."}` or `{"message": ["...", "..."]}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl GatewayError {
    /// Build the error for a non-2xx response from its status and raw body.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Request failed")
                .to_string()
        });

        if status == 401 {
            Self::Unauthorized { message }
        } else {
            Self::Status { status, message }
        }
    }

    /// HTTP status, when the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::InvalidUrl(_) | Self::Decode { .. } => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Client-side rejection (4xx other than 401), typically validation.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Status { status, .. } if (400..500).contains(status))
    }

    /// Text suitable for showing to a shopper or admin.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(err) if err.is_timeout() => {
                "The server took too long to respond".to_string()
            }
            Self::Http(_) => "Unable to reach the server".to_string(),
            Self::InvalidUrl(_) => "Invalid request".to_string(),
            Self::Unauthorized { message } | Self::Status { message, .. } => message.clone(),
            Self::Decode { .. } => "Unexpected response from the server".to_string(),
        }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let message = match parsed.message? {
        ErrorMessage::One(message) => message,
        ErrorMessage::Many(messages) => messages.join("; "),
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_body() {
        let err = GatewayError::from_response(422, r#"{"message":"Name is required"}"#);
        assert_eq!(err.user_message(), "Name is required");
        assert_eq!(err.status(), Some(422));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_message_list_is_joined() {
        let err = GatewayError::from_response(400, r#"{"message":["name empty","price < 0"]}"#);
        assert_eq!(err.user_message(), "name empty; price < 0");
    }

    #[test]
    fn test_fallback_to_reason_phrase() {
        let err = GatewayError::from_response(503, "<html>upstream down</html>");
        assert_eq!(err.user_message(), "Service Unavailable");
        assert!(!err.is_client_error());

        let err = GatewayError::from_response(500, r#"{"message":"   "}"#);
        assert_eq!(err.user_message(), "Internal Server Error");
    }

    #[test]
    fn test_unauthorized_is_distinct() {
        let err = GatewayError::from_response(401, r#"{"message":"Token expired"}"#);
        assert!(err.is_unauthorized());
        assert!(!err.is_client_error());
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "Unauthorized: Token expired");
    }

    #[test]
    fn test_not_found() {
        let err = GatewayError::from_response(404, "");
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "Not Found");
    }
}
