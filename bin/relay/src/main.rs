//! Command line entry point of the bridge relay.

pub mod cli;
pub mod commands;

use clap::Parser;

fn main() {
    if let Err(err) = cli::Cli::parse().run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
