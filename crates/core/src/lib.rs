//! Circuit Bazaar Core - Shared types and client-side commerce logic.
//!
//! This crate provides the pieces used across all Circuit Bazaar components:
//! - `gateway` - Typed client for the catalog backend
//! - `storefront` - Public-facing shop
//! - `admin` - Back-office CRUD API
//! - `cli` - Command-line catalog tools
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no sessions. Everything here can be unit tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, statuses and phone numbers
//! - [`catalog`] - Backend record types (taxonomy, products, SKUs, content)
//! - [`cart`] - The shopping cart aggregate
//! - [`variation`] - Variation selection and SKU resolution

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;
pub mod variation;

pub use cart::{Cart, CartItem, NewCartItem};
pub use types::*;
pub use variation::{GroupState, OptionState, Selection, VariationResolver, duplicate_option_set};
