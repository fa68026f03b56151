//! Proof Subcommand

use anyhow::{Context, Result, bail};
use bridge_merkle::{MerkleProofBundle, ParaHead, ParaId, build_parachain_proof};
use clap::Parser;
use std::{collections::HashMap, path::PathBuf};
use tracing::info;

/// The `proof` Subcommand
///
/// Builds the merkle proof that a parachain head is part of the heads committed to by a relay
/// chain block, as submitted to the Ethereum light client.
///
/// # Usage
///
/// ```sh
/// bridge-relay proof --heads heads.json --para-id 200 --verify
/// ```
///
/// The heads file is a JSON array of `{ "paraId": 200, "number": 12, "data": "0x…" }`.
#[derive(Parser, PartialEq, Eq, Debug, Clone)]
#[command(about = "Builds the merkle proof of a parachain head")]
pub struct ProofCommand {
    /// JSON file holding the parachain heads.
    #[arg(long = "heads")]
    pub heads: PathBuf,
    /// Parachain whose head is proven.
    #[arg(long = "para-id")]
    pub para_id: ParaId,
    /// Verifies the proof against its root before printing it.
    #[arg(long = "verify")]
    pub verify: bool,
}

impl ProofCommand {
    /// Runs the subcommand.
    pub fn run(self) -> Result<()> {
        let bundle = self.build()?;
        println!("{bundle}");
        Ok(())
    }

    /// Reads the heads and builds the proof bundle.
    pub fn build(&self) -> Result<MerkleProofBundle> {
        let raw = std::fs::read_to_string(&self.heads)
            .with_context(|| format!("failed to read heads from {}", self.heads.display()))?;
        let heads: Vec<ParaHead> = serde_json::from_str(&raw)
            .with_context(|| format!("invalid heads file {}", self.heads.display()))?;

        let mut by_id = HashMap::with_capacity(heads.len());
        for head in heads {
            let para_id = head.para_id;
            if by_id.insert(para_id, head).is_some() {
                bail!("duplicate head for parachain {para_id}");
            }
        }

        info!(
            target: "relay::proof",
            heads = by_id.len(),
            para_id = self.para_id,
            "Building parachain head proof"
        );
        let bundle = build_parachain_proof(&by_id, self.para_id)?;

        if self.verify {
            bundle.verify()?;
            info!(target: "relay::proof", root = %bundle.root, "Proof verified");
        }
        Ok(bundle)
    }
}
