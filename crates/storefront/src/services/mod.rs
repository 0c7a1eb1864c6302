//! Business logic services for storefront.
//!
//! # Services
//!
//! - `catalog` - Cached catalog reads with last-known-good listings
//! - `checkout` - Shipping validation and WhatsApp order composition
//! - `notifier` - Gateway failure reporting

pub mod catalog;
pub mod checkout;
pub mod notifier;

pub use catalog::{CatalogService, Listing};
pub use checkout::{CheckoutError, Order, ShippingForm, prepare_order};
pub use notifier::BreadcrumbNotifier;
