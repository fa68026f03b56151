use std::fmt;

use crate::ConfigError;

/// Environment variable holding the Ethereum signing key.
pub const ETHEREUM_KEY_ENV: &str = "ARTEMIS_ETHEREUM_KEY";

/// Environment variable holding the Substrate signing key.
pub const SUBSTRATE_KEY_ENV: &str = "ARTEMIS_SUBSTRATE_KEY";

/// A secret that never shows up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Signing keys for both adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Hex encoded Ethereum private key, without `0x` prefix.
    pub ethereum: Credential,
    /// Substrate secret URI or seed.
    pub substrate: Credential,
}

impl Credentials {
    /// Reads both keys from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads both keys through `lookup`. Empty values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &'static str| {
            lookup(name).filter(|value| !value.is_empty()).ok_or(ConfigError::MissingCredential(name))
        };

        let ethereum = read(ETHEREUM_KEY_ENV)?;
        let ethereum = ethereum.strip_prefix("0x").unwrap_or(&ethereum).to_string();
        let substrate = read(SUBSTRATE_KEY_ENV)?;

        Ok(Self { ethereum: Credential(ethereum), substrate: Credential(substrate) })
    }
}
