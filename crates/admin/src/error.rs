//! Unified error handling for admin.
//!
//! Every error answers with `{"error": "...", "fields"?: [...]}`. Backend
//! rejections keep their status and message so the admin sees why a write
//! was refused; transport failures become 502.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use circuit_bazaar_gateway::{GatewayError, UnknownResource};
use serde_json::json;
use thiserror::Error;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend call failed.
    #[error("Backend error: {0}")]
    Gateway(#[from] GatewayError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// `{resource}` is not a managed collection.
    #[error(transparent)]
    UnknownResource(#[from] UnknownResource),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Required fields are missing from a write.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// The write would break a uniqueness rule.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Gateway(err) if err.is_unauthorized() => StatusCode::UNAUTHORIZED,
            Self::Gateway(GatewayError::Status { status, .. }) if (400..500).contains(status) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            Self::Gateway(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UnknownResource(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MissingFields(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Gateway(err) => err.user_message(),
            _ => self.to_string(),
        };

        let body = match &self {
            Self::MissingFields(fields) => json!({ "error": message, "fields": fields }),
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
