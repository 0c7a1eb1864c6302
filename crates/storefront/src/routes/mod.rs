//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                 - Home page (carousel, banners, latest products)
//!
//! # Products
//! GET  /products                         - Product listing (page, limit, search, filters)
//! GET  /products/{product_id}            - Product detail (default SKU)
//! GET  /products/{product_id}/{sku_id}   - Product detail for a specific SKU
//! POST /products/{product_id}/select     - Toggle a variation option (HTMX fragment)
//!
//! # Search
//! GET  /search/suggest?q=                - Live search suggestions (fragment)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                             - Cart page
//! POST /cart/add                         - Add SKU (returns count badge, triggers cart-updated)
//! POST /cart/update                      - Set quantity (returns cart_items fragment)
//! POST /cart/remove                      - Remove line (returns cart_items fragment)
//! POST /cart/clear                       - Empty the cart
//! GET  /cart/count                       - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                         - Shipping form
//! POST /checkout                         - Validate and hand off to WhatsApp
//!
//! # Blog
//! GET  /blogs                            - Blog index
//! GET  /blogs/{id}                       - Blog post
//! ```

pub mod blog;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod products;
pub mod search;

use std::str::FromStr;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};
use serde::{Deserialize, Deserializer};
use tower_sessions::Session;

use crate::models::Toast;
use crate::models::session::{load_cart, take_toasts};
use crate::state::AppState;

// =============================================================================
// Shared View Data
// =============================================================================

/// Layout data every full page needs.
#[derive(Clone, Default)]
pub struct PageChrome {
    pub toasts: Vec<Toast>,
    pub cart_count: u32,
}

impl PageChrome {
    /// Drain pending toasts and read the cart badge count.
    pub async fn load(session: &Session) -> Self {
        Self {
            toasts: take_toasts(session).await,
            cart_count: load_cart(session).await.item_count(),
        }
    }
}

/// Previous/next links for a paginated listing.
#[derive(Clone, Default)]
pub struct PaginationView {
    pub page: u32,
    pub total_pages: u32,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl PaginationView {
    /// Build links with `url_for(page)`.
    pub fn new(pagination: &circuit_bazaar_gateway::Pagination, url_for: impl Fn(u32) -> String) -> Self {
        Self {
            page: pagination.page,
            total_pages: pagination.total_pages,
            prev_url: pagination
                .has_previous()
                .then(|| url_for(pagination.page - 1)),
            next_url: pagination.has_next().then(|| url_for(pagination.page + 1)),
        }
    }

    #[must_use]
    pub fn is_multi_page(&self) -> bool {
        self.total_pages > 1
    }
}

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "true")
}

/// Deserialize empty strings as None, since HTML forms submit blank inputs.
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{product_id}", get(products::show))
        .route("/{product_id}/select", post(products::select))
        .route("/{product_id}/{sku_id}", get(products::show_sku))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the blog routes router.
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(blog::index))
        .route("/{id}", get(blog::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .route("/search/suggest", get(search::suggest))
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::page).post(checkout::submit))
        .nest("/blogs", blog_routes())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use circuit_bazaar_gateway::Pagination;

    use super::*;

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("HX-Request", HeaderValue::from_static("true"));
        assert!(is_htmx(&headers));
    }

    #[test]
    fn test_pagination_links() {
        let pagination = Pagination {
            page: 2,
            limit: 12,
            total: 30,
            total_pages: 3,
        };
        let view = PaginationView::new(&pagination, |page| format!("/products?page={page}"));
        assert_eq!(view.prev_url.as_deref(), Some("/products?page=1"));
        assert_eq!(view.next_url.as_deref(), Some("/products?page=3"));
        assert!(view.is_multi_page());

        let first = Pagination { page: 1, ..pagination };
        assert!(PaginationView::new(&first, |p| p.to_string()).prev_url.is_none());
    }
}
