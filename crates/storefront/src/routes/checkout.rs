//! Checkout route handlers.
//!
//! A valid checkout clears the cart and redirects the shopper to WhatsApp
//! with the order pre-filled. Validation failures re-render the form with
//! the submitted values and an error toast.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::models::Toast;
use crate::models::session::{load_cart, push_toast, save_cart};
use crate::routes::PageChrome;
use crate::routes::cart::CartView;
use crate::services::{CheckoutError, ShippingForm, prepare_order};
use crate::state::AppState;

/// Checkout form template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/form.html")]
pub struct CheckoutTemplate {
    pub chrome: PageChrome,
    pub cart: CartView,
    pub form: ShippingForm,
}

/// Display the shipping form, or send an empty cart back to `/cart`.
#[instrument(skip(state, session))]
pub async fn page(State(state): State<AppState>, session: Session) -> Response {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    CheckoutTemplate {
        chrome: PageChrome::load(&session).await,
        cart: CartView::new(&cart, state.config().currency),
        form: ShippingForm::default(),
    }
    .into_response()
}

/// Validate the order and hand it off to WhatsApp.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ShippingForm>,
) -> Result<Response> {
    let config = state.config();
    let mut cart = load_cart(&session).await;

    match prepare_order(&cart, &form, config.currency, &config.whatsapp_number) {
        Ok(order) => {
            cart.clear();
            save_cart(&session, &cart).await?;
            tracing::info!("Order handed off to WhatsApp");
            Ok(Redirect::to(&order.whatsapp_url).into_response())
        }
        Err(CheckoutError::EmptyCart) => {
            push_toast(&session, Toast::warning(CheckoutError::EmptyCart.to_string())).await;
            Ok(Redirect::to("/cart").into_response())
        }
        Err(e) => {
            tracing::debug!(error = %e, "Checkout refused");
            push_toast(&session, Toast::error(e.to_string())).await;
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutTemplate {
                    chrome: PageChrome::load(&session).await,
                    cart: CartView::new(&cart, config.currency),
                    form,
                },
            )
                .into_response())
        }
    }
}
