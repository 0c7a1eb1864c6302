//! HTTP middleware stack for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with in-memory store)
//! 4. Expired-token sweep (drops the session when the backend answers 401)
//! 5. Auth guard extractor on every `/api` handler

pub mod auth;
pub mod session;

pub use auth::{AdminAuthRejection, RequireAdmin, expire_on_unauthorized};
pub use session::create_session_layer;
