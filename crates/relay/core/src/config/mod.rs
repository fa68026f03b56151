//! Relay configuration.
//!
//! The configuration is a TOML file with one table per concern:
//!
//! ```toml
//! [relay]
//! direction = "bidirectional"
//! headers-only = false
//!
//! [ethereum]
//! endpoint = "ws://127.0.0.1:8546"
//! beefy-block-delay = 5
//!
//! [ethereum.contracts]
//! beefy-light-client = "0x..."
//!
//! [substrate.parachain]
//! endpoint = "ws://127.0.0.1:11144"
//!
//! [substrate.relaychain]
//! endpoint = "ws://127.0.0.1:9944"
//!
//! [database]
//! path = "relay-journal.jsonl"
//! ```
//!
//! Signing keys are not part of the file, see [`Credentials`].

use std::path::Path;

use serde::{Deserialize, Serialize};

mod chains;
pub use chains::{DatabaseConfig, EndpointConfig, EthereumConfig, EthereumContracts, SubstrateConfig};

mod credentials;
pub use credentials::{Credential, Credentials, ETHEREUM_KEY_ENV, SUBSTRATE_KEY_ENV};

mod relay;
pub use relay::{Direction, RelayConfig};

mod error;
pub use error::ConfigError;

/// Complete relay configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Wiring policy.
    #[serde(default)]
    pub relay: RelayConfig,
    /// Ethereum adapter settings.
    pub ethereum: EthereumConfig,
    /// Substrate adapter settings.
    pub substrate: SubstrateConfig,
    /// Commitment store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Reads and validates the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = raw.parse()?;
        check_direction(&table)?;

        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every endpoint uses a scheme the adapters can dial.
    pub fn validate(&self) -> Result<(), ConfigError> {
        chains::check_endpoint("ethereum", &self.ethereum.endpoint)?;
        chains::check_endpoint("substrate.parachain", &self.substrate.parachain.endpoint)?;
        chains::check_endpoint("substrate.relaychain", &self.substrate.relaychain.endpoint)?;
        Ok(())
    }
}

/// Rejects an unknown `relay.direction` before the typed parse folds it into a syntax error.
fn check_direction(table: &toml::Table) -> Result<(), ConfigError> {
    let Some(direction) = table.get("relay").and_then(|relay| relay.get("direction")) else {
        return Ok(());
    };
    match direction.as_str() {
        Some(raw) => raw.parse::<Direction>().map(|_| ()),
        None => Err(ConfigError::InvalidDirection(direction.to_string())),
    }
}
