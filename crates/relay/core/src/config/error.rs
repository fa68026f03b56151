use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while loading the relay configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Config path.
        path: PathBuf,
        /// Cause.
        #[source]
        source: io::Error,
    },

    /// The config file is not valid TOML or has unexpected keys.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `relay.direction` is not a known direction.
    #[error(
        "invalid relay direction `{0}`, expected one of: bidirectional, source-to-dest, dest-to-source"
    )]
    InvalidDirection(String),

    /// A required credential is not set.
    #[error("environment variable not set: {0}")]
    MissingCredential(&'static str),

    /// An endpoint uses a scheme the adapters cannot dial.
    #[error("unsupported scheme `{scheme}` for {name} endpoint")]
    InvalidEndpoint {
        /// Config key of the endpoint.
        name: &'static str,
        /// Offending scheme.
        scheme: String,
    },
}

impl PartialEq for ConfigError {
    fn eq(&self, other: &Self) -> bool {
        use ConfigError::*;
        match (self, other) {
            (Io { path: a, .. }, Io { path: b, .. }) => a == b,
            (Parse(a), Parse(b)) => a.message() == b.message(),
            (InvalidDirection(a), InvalidDirection(b)) => a == b,
            (MissingCredential(a), MissingCredential(b)) => a == b,
            (
                InvalidEndpoint { name: a, scheme: sa },
                InvalidEndpoint { name: b, scheme: sb },
            ) => a == b && sa == sb,
            _ => false,
        }
    }
}
