//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Each handler loads it, applies
//! one change and stores it back. Mutations answer HTMX requests with a
//! fragment plus an `HX-Trigger: cart-updated` header so the badge refreshes;
//! plain form posts are redirected to the cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use circuit_bazaar_core::{Cart, CartItem, CurrencyCode, NewCartItem, Price, SkuId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::models::Toast;
use crate::models::session::{load_cart, push_toast, save_cart};
use crate::routes::{PageChrome, is_htmx};
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub sku_id: String,
    pub title: String,
    pub category: Option<String>,
    pub image: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub order_limit: Option<u32>,
    pub over_limit: bool,
}

impl CartItemView {
    fn new(item: &CartItem, currency: CurrencyCode) -> Self {
        Self {
            sku_id: item.sku_id.to_string(),
            title: item.title.clone(),
            category: item.category.clone(),
            image: item.image.clone(),
            quantity: item.quantity,
            price: Price::new(item.unit_price, currency).display(),
            line_price: Price::new(item.line_total(), currency).display(),
            order_limit: item.order_limit,
            over_limit: item.exceeds_order_limit(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemView::new(item, currency))
                .collect(),
            total: cart.total_price(currency).display(),
            item_count: cart.item_count(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub sku_id: String,
}

/// Update cart form data.
///
/// Signed so a quantity stepped below zero still parses and removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub sku_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub sku_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub chrome: PageChrome,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Answer a cart mutation: items fragment for HTMX, redirect otherwise.
fn items_response(headers: &HeaderMap, cart: &Cart, currency: CurrencyCode) -> Response {
    if !is_htmx(headers) {
        return Redirect::to("/cart").into_response();
    }
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::new(cart, currency),
        },
    )
        .into_response()
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let chrome = PageChrome::load(&session).await;
    let cart = load_cart(&session).await;

    CartShowTemplate {
        chrome,
        cart: CartView::new(&cart, state.config().currency),
    }
}

/// Add one unit of a SKU to the cart.
///
/// The SKU is re-read from the catalog so the stored snapshot carries the
/// current title, price and order limit. Out-of-stock SKUs are refused with
/// a warning toast.
#[instrument(skip(state, session, headers), fields(sku_id = %form.sku_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let sku = state
        .catalog()
        .sku(&SkuId::new(form.sku_id))
        .await
        .map_err(|e| AppError::from_lookup(e, "Product variant"))?;

    let mut cart = load_cart(&session).await;
    if sku.in_stock {
        cart.add(NewCartItem::from(&sku));
        save_cart(&session, &cart).await?;
        tracing::info!(items = cart.item_count(), "Added to cart");
    } else {
        push_toast(
            &session,
            Toast::warning(format!("{} is out of stock", sku.display_title())),
        )
        .await;
    }

    if !is_htmx(&headers) {
        return Ok(Redirect::to("/cart").into_response());
    }

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: cart.item_count(),
        },
    )
        .into_response())
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.update_quantity(&SkuId::new(form.sku_id), form.quantity);
    save_cart(&session, &cart).await?;

    Ok(items_response(&headers, &cart, state.config().currency))
}

/// Remove a line from the cart.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.remove(&SkuId::new(form.sku_id));
    save_cart(&session, &cart).await?;

    Ok(items_response(&headers, &cart, state.config().currency))
}

/// Empty the cart.
#[instrument(skip(state, session, headers))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response> {
    let mut cart = load_cart(&session).await;
    cart.clear();
    save_cart(&session, &cart).await?;

    Ok(items_response(&headers, &cart, state.config().currency))
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    CartCountTemplate {
        count: load_cart(&session).await.item_count(),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_cart_view_formats_lines() {
        let mut cart = Cart::new();
        let item = NewCartItem {
            sku_id: SkuId::new("cable"),
            title: "USB-C Cable".to_string(),
            unit_price: Decimal::new(450, 2),
            image: None,
            category: None,
            order_limit: Some(1),
        };
        cart.add(item.clone());
        cart.add(item);

        let view = CartView::new(&cart, CurrencyCode::USD);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.total, "$9.00");
        assert_eq!(view.items.len(), 1);
        assert!(view.items.iter().all(|line| line.over_limit));
        assert!(!view.is_empty());
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::new(&Cart::new(), CurrencyCode::USD);
        assert!(view.is_empty());
        assert_eq!(view.total, "$0.00");
    }
}
