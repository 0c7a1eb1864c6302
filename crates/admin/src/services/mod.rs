//! Request handling helpers for the admin API.
//!
//! # Services
//!
//! - `payload` - JSON or multipart write bodies
//! - `validation` - Required fields and SKU option-set uniqueness

pub mod payload;
pub mod validation;

pub use payload::ResourcePayload;
pub use validation::{WriteKind, check_sku_options, missing_fields, required_fields, sku_options};
