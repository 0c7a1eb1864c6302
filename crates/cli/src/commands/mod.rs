//! CLI command implementations.

pub mod list;
pub mod resolve;

use circuit_bazaar_gateway::{GatewayError, UnknownResource};

/// Errors surfaced by commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    UnknownResource(#[from] UnknownResource),
    #[error("option {0} does not belong to any variation of this product")]
    UnknownOption(String),
}
