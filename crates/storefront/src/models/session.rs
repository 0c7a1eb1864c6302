//! Session-related types.
//!
//! The visitor's cart and pending flash messages live in the session. Every
//! handler loads what it needs, applies one change and saves it back.

use circuit_bazaar_core::Cart;
use circuit_bazaar_gateway::{Notification, Severity};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session keys for storefront data.
pub mod keys {
    /// Key for the visitor's cart.
    pub const CART: &str = "cart";

    /// Key for queued flash messages.
    pub const TOASTS: &str = "toasts";
}

/// A flash message shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub severity: Severity,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// CSS modifier for the toast.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.severity.as_str()
    }
}

impl From<Notification> for Toast {
    fn from(notification: Notification) -> Self {
        Self {
            severity: notification.severity,
            message: notification.message,
        }
    }
}

/// Load the cart, or an empty one if none is stored or it cannot be read.
pub async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read cart from session");
            Cart::default()
        }
    }
}

/// Store the cart.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CART, cart).await
}

/// Queue a flash message for the next page.
pub async fn push_toast(session: &Session, toast: Toast) {
    let mut toasts = session
        .get::<Vec<Toast>>(keys::TOASTS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    toasts.push(toast);

    if let Err(e) = session.insert(keys::TOASTS, toasts).await {
        tracing::error!(error = %e, "Failed to queue toast");
    }
}

/// Take all queued flash messages.
pub async fn take_toasts(session: &Session) -> Vec<Toast> {
    session
        .remove::<Vec<Toast>>(keys::TOASTS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use circuit_bazaar_core::{NewCartItem, SkuId};
    use rust_decimal::Decimal;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_cart_round_trips_through_session() {
        let session = session();
        assert!(load_cart(&session).await.is_empty());

        let mut cart = Cart::new();
        cart.add(NewCartItem {
            sku_id: SkuId::new("sku-1"),
            title: "USB-C cable".to_string(),
            unit_price: Decimal::new(999, 2),
            image: None,
            category: None,
            order_limit: Some(5),
        });
        save_cart(&session, &cart).await.unwrap();

        assert_eq!(load_cart(&session).await, cart);
    }

    #[tokio::test]
    async fn test_toasts_are_shown_once() {
        let session = session();
        push_toast(&session, Toast::success("Added to cart")).await;
        push_toast(&session, Toast::error("Out of stock")).await;

        let toasts = take_toasts(&session).await;
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[1].kind(), "error");
        assert!(take_toasts(&session).await.is_empty());
    }
}
