use thiserror::Error;

use crate::{ChannelClosed, ConfigError};

/// Errors surfaced by chain adapters.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The adapter settings are malformed.
    #[error("invalid adapter configuration: {0}")]
    Config(String),

    /// The chain endpoint could not be reached.
    #[error("connection to {endpoint} failed: {reason}")]
    Connection {
        /// Endpoint the adapter tried to reach.
        endpoint: String,
        /// Failure reason.
        reason: String,
    },

    /// A credential is missing or malformed.
    #[error(transparent)]
    Credential(#[from] ConfigError),

    /// A counterpart channel closed.
    #[error(transparent)]
    Channel(#[from] ChannelClosed),

    /// The init handshake with the counterpart adapter failed.
    #[error("init handshake failed: {0}")]
    Handshake(String),

    /// The adapter was started twice or wired after start.
    #[error("adapter {0} already started")]
    AlreadyStarted(String),

    /// Any other adapter specific failure.
    #[error("{0}")]
    Other(String),
}

impl PartialEq for ChainError {
    fn eq(&self, other: &Self) -> bool {
        use ChainError::*;
        match (self, other) {
            (Config(a), Config(b)) |
            (Handshake(a), Handshake(b)) |
            (AlreadyStarted(a), AlreadyStarted(b)) |
            (Other(a), Other(b)) => a == b,
            (
                Connection { endpoint: a, reason: ra },
                Connection { endpoint: b, reason: rb },
            ) => a == b && ra == rb,
            (Credential(a), Credential(b)) => a.to_string() == b.to_string(),
            (Channel(_), Channel(_)) => true,
            _ => false,
        }
    }
}
