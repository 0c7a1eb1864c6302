//! Authentication extractor and session expiry for admin.

use axum::{
    Json,
    extract::{FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{AdminSession, session_keys};

/// Extractor that requires a signed-in admin.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {:?}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub AdminSession);

/// Error returned when a route needs a signed-in admin.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// No session layer or no admin in the session.
    Unauthorized,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Sign in required" })),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        let admin: AdminSession = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        Ok(Self(admin))
    }
}

/// Drop the session when a request ends in 401.
///
/// A 401 here means the backend no longer accepts the stored token (or there
/// never was one), so the admin has to sign in again.
pub async fn expire_on_unauthorized(session: Session, request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if response.status() == StatusCode::UNAUTHORIZED {
        match session.flush().await {
            Ok(()) => tracing::info!("Cleared admin session after 401"),
            Err(e) => tracing::error!(error = %e, "Failed to clear admin session"),
        }
    }

    response
}
