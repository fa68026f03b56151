use std::path::PathBuf;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::ConfigError;

const DEFAULT_BEEFY_BLOCK_DELAY: u64 = 5;

/// Addresses of the bridge contracts on Ethereum. Unlisted contracts default to the zero address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EthereumContracts {
    /// BEEFY light client.
    pub beefy_light_client: Address,
    /// Parachain light client, verifies parachain head proofs.
    pub parachain_light_client: Address,
    /// Basic inbound channel.
    pub basic_inbound_channel: Address,
    /// Basic outbound channel.
    pub basic_outbound_channel: Address,
    /// Incentivized inbound channel.
    pub incentivized_inbound_channel: Address,
    /// Incentivized outbound channel.
    pub incentivized_outbound_channel: Address,
}

/// Ethereum adapter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EthereumConfig {
    /// Websocket or HTTP RPC endpoint.
    pub endpoint: Url,
    /// Bridge contract addresses.
    #[serde(default)]
    pub contracts: EthereumContracts,
    /// Blocks to wait between the two BEEFY verification steps.
    #[serde(default = "default_beefy_block_delay")]
    pub beefy_block_delay: u64,
}

const fn default_beefy_block_delay() -> u64 {
    DEFAULT_BEEFY_BLOCK_DELAY
}

/// A substrate node endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EndpointConfig {
    /// RPC endpoint.
    pub endpoint: Url,
}

/// Substrate adapter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SubstrateConfig {
    /// Bridge parachain node.
    pub parachain: EndpointConfig,
    /// Relay chain node, source of BEEFY commitments and parachain heads.
    pub relaychain: EndpointConfig,
}

/// Commitment store settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DatabaseConfig {
    /// Journal file. The store is memory only when unset.
    pub path: Option<PathBuf>,
}

pub(crate) fn check_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
    match url.scheme() {
        "ws" | "wss" | "http" | "https" => Ok(()),
        scheme => Err(ConfigError::InvalidEndpoint { name, scheme: scheme.to_string() }),
    }
}
