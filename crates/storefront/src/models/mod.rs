//! Data stored in the visitor session.

pub mod session;

pub use session::{Toast, keys as session_keys};
