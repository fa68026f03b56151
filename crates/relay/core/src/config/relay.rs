use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Which legs of the bridge are relayed.
///
/// The source side is the Ethereum chain, the destination side the Substrate chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Direction {
    /// Both legs.
    #[default]
    Bidirectional,
    /// Ethereum to Substrate only.
    SourceToDest,
    /// Substrate to Ethereum only.
    DestToSource,
}

impl Direction {
    /// Config value of the direction.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bidirectional => "bidirectional",
            Self::SourceToDest => "source-to-dest",
            Self::DestToSource => "dest-to-source",
        }
    }

    /// Returns true if the Ethereum to Substrate leg is active.
    pub const fn source_to_dest(&self) -> bool {
        matches!(self, Self::Bidirectional | Self::SourceToDest)
    }

    /// Returns true if the Substrate to Ethereum leg is active.
    pub const fn dest_to_source(&self) -> bool {
        matches!(self, Self::Bidirectional | Self::DestToSource)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bidirectional" => Ok(Self::Bidirectional),
            "source-to-dest" => Ok(Self::SourceToDest),
            "dest-to-source" => Ok(Self::DestToSource),
            other => Err(ConfigError::InvalidDirection(other.to_string())),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Direction> for String {
    fn from(value: Direction) -> Self {
        value.as_str().to_string()
    }
}

/// Relay wiring policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RelayConfig {
    /// Legs to relay.
    #[serde(default)]
    pub direction: Direction,
    /// Relay heads only, suppressing every message channel.
    #[serde(default)]
    pub headers_only: bool,
}

impl RelayConfig {
    /// Creates a new [`RelayConfig`].
    pub const fn new(direction: Direction, headers_only: bool) -> Self {
        Self { direction, headers_only }
    }
}
