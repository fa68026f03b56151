//! Contains the relay CLI.

use crate::commands::{ConfigCommand, ProofCommand};
use anyhow::Result;
use bridge_cli::{LogArgs, LogConfig, cli_styles};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Subcommands for the CLI.
#[derive(Debug, PartialEq, Eq, Clone, Subcommand)]
pub enum Commands {
    /// Builds the merkle proof of a parachain head.
    #[command(alias = "p")]
    Proof(ProofCommand),
    /// Checks a relay configuration and prints its wiring.
    #[command(alias = "c", alias = "check")]
    Config(ConfigCommand),
}

/// The relay CLI.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, styles = cli_styles(), long_about = None)]
pub struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub subcommand: Commands,
    /// Logging arguments.
    #[command(flatten)]
    pub log_args: LogArgs,
}

impl Cli {
    /// Runs the CLI.
    pub fn run(self) -> Result<()> {
        LogConfig::new(self.log_args.clone())
            .init_tracing_subscriber(Some(EnvFilter::from_default_env()))?;

        match self.subcommand {
            Commands::Proof(proof) => proof.run(),
            Commands::Config(config) => config.run(),
        }
    }
}
