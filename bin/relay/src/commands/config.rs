//! Config Subcommand

use anyhow::{Context, Result};
use bridge_relay_core::{
    Credentials,
    config::{Config, ConfigError},
};
use bridge_relay_service::WiringPlan;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// The `config` Subcommand
///
/// Loads a relay configuration, checks that both signing keys are available and prints the
/// channels the relay would wire.
///
/// # Usage
///
/// ```sh
/// ARTEMIS_ETHEREUM_KEY=0x… ARTEMIS_SUBSTRATE_KEY=//Alice bridge-relay config --config relay.toml
/// ```
#[derive(Parser, PartialEq, Eq, Debug, Clone)]
#[command(about = "Checks a relay configuration and prints its wiring")]
pub struct ConfigCommand {
    /// Relay configuration file.
    #[arg(long = "config", short = 'c', env = "BRIDGE_RELAY_CONFIG")]
    pub config: PathBuf,
}

impl ConfigCommand {
    /// Runs the subcommand.
    pub fn run(self) -> Result<()> {
        let plan = self.check(Credentials::from_env)?;
        println!("{plan}");
        Ok(())
    }

    /// Validates the configuration, then the credentials `credentials` loads, returning the
    /// wiring plan.
    pub fn check(
        &self,
        credentials: impl FnOnce() -> Result<Credentials, ConfigError>,
    ) -> Result<WiringPlan> {
        let config = Config::load(&self.config)
            .with_context(|| format!("invalid config {}", self.config.display()))?;
        credentials()?;

        info!(
            target: "relay::config",
            direction = %config.relay.direction,
            headers_only = config.relay.headers_only,
            "Configuration is valid"
        );
        Ok(WiringPlan::new(&config.relay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_relay_core::config::{ETHEREUM_KEY_ENV, SUBSTRATE_KEY_ENV};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
        [relay]
        direction = "dest-to-source"

        [ethereum]
        endpoint = "ws://127.0.0.1:8546"

        [ethereum.contracts]
        beefy-light-client = "0x8cf6147918a5cbb672703f879f385036f8793a24"

        [substrate.parachain]
        endpoint = "ws://127.0.0.1:11144"

        [substrate.relaychain]
        endpoint = "ws://127.0.0.1:9944"
    "#;

    fn config_file(raw: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(raw.as_bytes()).unwrap();
        file
    }

    fn keys(name: &str) -> Option<String> {
        match name {
            ETHEREUM_KEY_ENV => {
                Some("0x4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d".into())
            }
            SUBSTRATE_KEY_ENV => Some("//Relay".into()),
            _ => None,
        }
    }

    #[test]
    fn test_prints_plan() {
        let file = config_file(CONFIG);
        let command = ConfigCommand { config: file.path().to_path_buf() };
        let plan = command.check(|| Credentials::from_lookup(keys)).unwrap();
        assert_eq!(
            plan.to_string(),
            "substrate -> ethereum: headers, messages\nstart order: ethereum, substrate"
        );
    }

    #[test]
    fn test_missing_credential() {
        let file = config_file(CONFIG);
        let command = ConfigCommand { config: file.path().to_path_buf() };
        let err = command
            .check(|| {
                Credentials::from_lookup(|name| (name == ETHEREUM_KEY_ENV).then(|| "0x01".into()))
            })
            .unwrap_err();
        assert!(err.to_string().contains(SUBSTRATE_KEY_ENV), "{err}");
    }

    #[test]
    fn test_invalid_endpoint_scheme() {
        let file = config_file(&CONFIG.replace("ws://127.0.0.1:8546", "ftp://127.0.0.1:8546"));
        let command = ConfigCommand { config: file.path().to_path_buf() };
        let loaded = std::cell::Cell::new(false);
        let result = command.check(|| {
            loaded.set(true);
            Credentials::from_lookup(keys)
        });
        assert!(result.is_err());
        assert!(!loaded.get(), "credentials are read only for a valid config");
    }
}
