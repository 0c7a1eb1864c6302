//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                  - Health check
//!
//! # Auth
//! POST   /auth/login                              - Exchange credentials for a backend token
//! POST   /auth/logout                             - Drop the session
//! GET    /auth/me                                 - Signed-in admin
//!
//! # Resources (require a signed-in admin)
//! GET    /api/{resource}                          - List (page, limit, search, status, filter ids)
//! POST   /api/{resource}                          - Create (JSON or multipart)
//! GET    /api/{resource}/{id}                     - Fetch one
//! PUT    /api/{resource}/{id}                     - Replace (JSON or multipart)
//! DELETE /api/{resource}/{id}                     - Delete
//! PATCH  /api/{resource}/{id}/status              - Set active/inactive
//!
//! # Product SKUs
//! GET    /api/products/{id}/skus                  - SKUs of a product
//! POST   /api/products/{id}/skus/validate         - Check a proposed option set for duplicates
//! ```
//!
//! `{resource}` is one of categories, sub-categories, inner-categories,
//! brands, products, product-skus, banners, blogs, carousels.

pub mod auth;
pub mod resources;
pub mod skus;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the resource API router.
///
/// The SKU routes sit under the same `{resource}` parameter as the generic
/// routes and answer 404 for anything but `products`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/{resource}", get(resources::list).post(resources::create))
        .route(
            "/{resource}/{id}",
            get(resources::show)
                .put(resources::update)
                .delete(resources::destroy),
        )
        .route("/{resource}/{id}/status", patch(resources::set_status))
        .route("/{resource}/{id}/skus", get(skus::list))
        .route("/{resource}/{id}/skus/validate", post(skus::validate))
}

/// Create all routes for the admin API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
}
