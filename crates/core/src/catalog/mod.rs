//! Record types returned by the catalog backend.
//!
//! These mirror the backend's JSON payloads. Decoding happens once at the
//! gateway boundary, so a malformed response fails there with a decode
//! error instead of leaking half-filled values into views.

pub mod content;
pub mod product;
pub mod taxonomy;

pub use content::{Banner, BlogPost, CarouselSlide};
pub use product::{Product, ProductSku, SkuOption, VariationGroup, VariationOption};
pub use taxonomy::{Brand, Category, InnerCategory, SubCategory};
