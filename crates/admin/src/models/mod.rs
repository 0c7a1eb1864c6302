//! Data stored in the admin session.

pub mod session;

pub use session::{AdminSession, keys as session_keys};
