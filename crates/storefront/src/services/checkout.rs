//! Checkout: shipping validation and the WhatsApp order message.
//!
//! There is no order API. A valid checkout becomes a pre-filled WhatsApp
//! message to the store; the cart is cleared once the shopper is sent there.

use std::fmt::Write as _;

use circuit_bazaar_core::{Cart, CurrencyCode, Phone, PhoneError, Price};
use serde::Deserialize;
use thiserror::Error;

/// Shipping details as submitted by the checkout form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub notes: String,
}

/// Reasons a checkout is refused before leaving the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Phone number is invalid: {0}")]
    InvalidPhone(#[from] PhoneError),

    #[error("You can order at most {limit} of {title} (you have {quantity})")]
    OrderLimitExceeded {
        title: String,
        limit: u32,
        quantity: u32,
    },
}

/// Validated shipping details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shipping {
    pub full_name: String,
    pub phone: Phone,
    pub address: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
}

impl ShippingForm {
    /// Check required fields and normalize the phone number.
    ///
    /// # Errors
    ///
    /// Returns the first missing field, or an invalid phone number.
    pub fn validate(&self) -> Result<Shipping, CheckoutError> {
        let full_name = required(&self.full_name, "Full name")?;
        let phone_raw = required(&self.phone, "Phone")?;
        let address = required(&self.address, "Address")?;
        let city = required(&self.city, "City")?;
        let phone = Phone::parse(&phone_raw)?;

        Ok(Shipping {
            full_name,
            phone,
            address,
            city,
            postal_code: optional(&self.postal_code),
            notes: optional(&self.notes),
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, CheckoutError> {
    optional(value).ok_or(CheckoutError::MissingField(field))
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// A composed order ready to hand off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub message: String,
    pub whatsapp_url: String,
}

/// Validate the cart and shipping details and compose the order.
///
/// # Errors
///
/// Returns `EmptyCart`, a field error, or `OrderLimitExceeded` for the first
/// line above its SKU's per-order maximum.
pub fn prepare_order(
    cart: &Cart,
    form: &ShippingForm,
    currency: CurrencyCode,
    whatsapp_number: &str,
) -> Result<Order, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    if let Some(line) = cart.over_limit().next() {
        return Err(CheckoutError::OrderLimitExceeded {
            title: line.title.clone(),
            limit: line.order_limit.unwrap_or_default(),
            quantity: line.quantity,
        });
    }

    let shipping = form.validate()?;
    let message = compose_message(cart, &shipping, currency);
    let whatsapp_url = whatsapp_link(whatsapp_number, &message);

    Ok(Order {
        message,
        whatsapp_url,
    })
}

/// Plain-text order summary.
#[must_use]
pub fn compose_message(cart: &Cart, shipping: &Shipping, currency: CurrencyCode) -> String {
    let mut message = String::from("New order\n\n");

    for line in cart.items() {
        let total = Price::new(line.line_total(), currency);
        let _ = writeln!(message, "{} × {} — {}", line.quantity, line.title, total);
    }

    let _ = writeln!(message, "\nTotal: {}", cart.total_price(currency));

    let _ = writeln!(message, "\nName: {}", shipping.full_name);
    let _ = writeln!(message, "Phone: {}", shipping.phone);
    let _ = write!(message, "Address: {}, {}", shipping.address, shipping.city);
    if let Some(postal_code) = &shipping.postal_code {
        let _ = write!(message, " {postal_code}");
    }
    if let Some(notes) = &shipping.notes {
        let _ = write!(message, "\nNotes: {notes}");
    }

    message
}

/// `https://wa.me/<number>?text=<message>`.
#[must_use]
pub fn whatsapp_link(number: &str, message: &str) -> String {
    format!(
        "https://wa.me/{number}?text={}",
        urlencoding::encode(message)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use circuit_bazaar_core::{NewCartItem, SkuId};
    use rust_decimal::Decimal;

    use super::*;

    fn item(id: &str, title: &str, cents: i64, limit: Option<u32>) -> NewCartItem {
        NewCartItem {
            sku_id: SkuId::new(id),
            title: title.to_string(),
            unit_price: Decimal::new(cents, 2),
            image: None,
            category: None,
            order_limit: limit,
        }
    }

    fn form() -> ShippingForm {
        ShippingForm {
            full_name: "  Ada Lovelace ".to_string(),
            phone: "+44 20-7946-0958".to_string(),
            address: "12 Analytical Row".to_string(),
            city: "London".to_string(),
            postal_code: String::new(),
            notes: "Ring twice".to_string(),
        }
    }

    #[test]
    fn test_validate_trims_and_normalizes() {
        let shipping = form().validate().unwrap();
        assert_eq!(shipping.full_name, "Ada Lovelace");
        assert_eq!(shipping.phone.digits(), "442079460958");
        assert_eq!(shipping.postal_code, None);
        assert_eq!(shipping.notes.as_deref(), Some("Ring twice"));
    }

    #[test]
    fn test_missing_fields() {
        let mut missing_city = form();
        missing_city.city = "   ".to_string();
        assert_eq!(
            missing_city.validate(),
            Err(CheckoutError::MissingField("City"))
        );

        let empty = ShippingForm::default();
        assert_eq!(
            empty.validate(),
            Err(CheckoutError::MissingField("Full name"))
        );
    }

    #[test]
    fn test_bad_phone() {
        let mut bad = form();
        bad.phone = "12345".to_string();
        assert!(matches!(
            bad.validate(),
            Err(CheckoutError::InvalidPhone(PhoneError::BadLength { .. }))
        ));
    }

    #[test]
    fn test_empty_cart_is_refused() {
        let result = prepare_order(&Cart::new(), &form(), CurrencyCode::USD, "15550100");
        assert_eq!(result, Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_order_limit_enforced_at_checkout() {
        let mut cart = Cart::new();
        cart.add(item("gpu", "RTX 5090", 199_900, Some(1)));
        cart.add(item("gpu", "RTX 5090", 199_900, Some(1)));

        let err = prepare_order(&cart, &form(), CurrencyCode::USD, "15550100").unwrap_err();
        assert_eq!(
            err,
            CheckoutError::OrderLimitExceeded {
                title: "RTX 5090".to_string(),
                limit: 1,
                quantity: 2,
            }
        );
    }

    #[test]
    fn test_message_and_link() {
        let mut cart = Cart::new();
        cart.add(item("a", "USB-C cable", 1000, None));
        cart.add(item("a", "USB-C cable", 1000, None));
        cart.add(item("b", "Charger", 2500, Some(3)));

        let order = prepare_order(&cart, &form(), CurrencyCode::USD, "15550100").unwrap();

        assert!(order.message.contains("2 × USB-C cable — $20.00"));
        assert!(order.message.contains("1 × Charger — $25.00"));
        assert!(order.message.contains("Total: $45.00"));
        assert!(order.message.contains("Phone: +442079460958"));
        assert!(order.message.contains("Address: 12 Analytical Row, London"));
        assert!(order.message.ends_with("Notes: Ring twice"));
        assert!(order.whatsapp_url.starts_with("https://wa.me/15550100?text=New%20order"));
        assert!(!order.whatsapp_url.contains(' '));
    }
}
