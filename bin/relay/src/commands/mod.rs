//! Contains subcommands for the bridge relay.

mod config;
pub use config::ConfigCommand;

mod proof;
pub use proof::ProofCommand;
