//! Circuit Bazaar backend gateway.
//!
//! Every storefront page, admin screen and CLI command talks to the commerce
//! backend through [`ApiClient`]. The client owns the conventions of that
//! backend:
//!
//! - bearer token authentication
//! - `{"data": ...}` envelopes and paginated lists
//! - JSON or multipart request bodies
//! - `{"message": ...}` error bodies, normalized into [`GatewayError`]
//!
//! Failures are also pushed to a [`Notifier`] so the calling surface can tell
//! the user without every call site formatting its own message.
//!
//! # Example
//!
//! ```rust,ignore
//! use circuit_bazaar_gateway::{ApiClient, ClientConfig, ListQuery, TracingNotifier};
//!
//! let client = ApiClient::new(&config, Arc::new(TracingNotifier))?;
//! let page = client.list_products(&ListQuery::new().search("usb")).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
mod envelope;
mod error;
mod multipart;
mod notify;
mod query;
mod resources;
mod sequence;

pub use client::{ApiClient, ClientConfig, Method, RequestBody};
pub use envelope::{Envelope, Page, Pagination};
pub use error::GatewayError;
pub use multipart::{FormPart, MultipartForm};
pub use notify::{MemoryNotifier, Notification, Notifier, Severity, TracingNotifier};
pub use query::ListQuery;
pub use resources::{LoginRequest, LoginResponse, ResourceKind, UnknownResource};
pub use sequence::{RequestSequencer, SnapshotStore, Ticket};

/// Result alias for gateway calls.
pub type Result<T> = std::result::Result<T, GatewayError>;
