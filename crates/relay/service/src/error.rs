use bridge_relay_core::{ChainError, ConfigError, StoreError};
use thiserror::Error;

/// Errors returned while building or starting the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The commitment store could not be built or started.
    #[error("commitment store: {0}")]
    Store(#[from] StoreError),
    /// A chain adapter could not be built, wired or started.
    #[error("{chain} adapter: {source}")]
    Chain {
        /// Name of the adapter.
        chain: String,
        /// Adapter failure.
        #[source]
        source: ChainError,
    },
}

impl RelayError {
    pub(crate) fn chain(chain: impl Into<String>, source: ChainError) -> Self {
        Self::Chain { chain: chain.into(), source }
    }
}

impl PartialEq for RelayError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Config(a), Self::Config(b)) => a == b,
            (Self::Store(a), Self::Store(b)) => a == b,
            (Self::Chain { chain: a, source: e1 }, Self::Chain { chain: b, source: e2 }) => {
                a == b && e1 == e2
            }
            _ => false,
        }
    }
}
