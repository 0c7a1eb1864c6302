//! Admin sign-in.
//!
//! The backend owns admin accounts. Login trades credentials for a backend
//! token that is kept in the session and sent with every `/api` call.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use circuit_bazaar_gateway::LoginRequest;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{AdminSession, session_keys};
use crate::state::AppState;

/// Login request body.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signed-in admin as returned to the client.
#[derive(Debug, Serialize)]
pub struct AdminProfile {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<&AdminSession> for AdminProfile {
    fn from(admin: &AdminSession) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.clone(),
        }
    }
}

/// Sign in with backend credentials.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<AdminProfile>> {
    let email = form.email.trim().to_string();
    if email.is_empty() || form.password.is_empty() {
        return Err(AppError::MissingFields(
            [("email", email.is_empty()), ("password", form.password.is_empty())]
                .into_iter()
                .filter_map(|(field, missing)| missing.then_some(field))
                .collect(),
        ));
    }

    let response = state
        .client()
        .login(&LoginRequest {
            email: email.clone(),
            password: SecretString::from(form.password),
        })
        .await?;

    let admin = AdminSession::new(
        response.token.expose_secret().to_string(),
        response.name,
        response.email.or(Some(email)),
    );

    // New session id on privilege change
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, &admin).await?;
    tracing::info!("Admin signed in");

    Ok(Json(AdminProfile::from(&admin)))
}

/// Sign out.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    session.flush().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current admin.
pub async fn me(RequireAdmin(admin): RequireAdmin) -> Json<AdminProfile> {
    Json(AdminProfile::from(&admin))
}
