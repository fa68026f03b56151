//! Commands and contract of the BEEFY commitment store.
//!
//! Adapters enqueue [`StoreCommand`]s on the shared commitment channel and never wait for an
//! answer. The store drains the channel on its own task.

use std::{fmt::Debug, io, path::PathBuf};

use alloy_primitives::{Address, B256, Bytes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TaskGroup;

/// Progress of a BEEFY commitment through the two step light client verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BeefyStatus {
    /// Commitment observed on the relay chain.
    #[default]
    CommitmentWitnessed,
    /// Initial verification transaction submitted.
    InitialVerificationTxSent,
    /// Initial verification transaction included.
    InitialVerificationTxConfirmed,
    /// Enough blocks passed to complete the verification.
    ReadyToComplete,
    /// Complete verification transaction submitted.
    CompleteVerificationTxSent,
}

/// A BEEFY commitment tracked by the relay, keyed by commitment block number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeefyRecord {
    /// Relay chain block number the commitment is for.
    pub block_number: u64,
    /// Ethereum addresses of the signing validators.
    pub validator_addresses: Vec<Address>,
    /// Encoded signed commitment.
    pub signed_commitment: Bytes,
    /// Verification progress.
    pub status: BeefyStatus,
    /// Hash of the initial verification transaction.
    pub initial_verification_tx: Option<B256>,
    /// Ethereum block after which verification can be completed.
    pub complete_on_block: Option<u64>,
    /// Randomness used to pick the validator signatures to reveal.
    pub random_seed: Option<B256>,
    /// Hash of the complete verification transaction.
    pub complete_verification_tx: Option<B256>,
    /// Light client verification id.
    pub contract_id: Option<u64>,
}

impl BeefyRecord {
    /// Creates a freshly witnessed record.
    pub fn witnessed(
        block_number: u64,
        validator_addresses: Vec<Address>,
        signed_commitment: Bytes,
    ) -> Self {
        Self { block_number, validator_addresses, signed_commitment, ..Default::default() }
    }

    /// Applies the set fields of `update`.
    pub fn apply(&mut self, update: &BeefyUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(tx) = update.initial_verification_tx {
            self.initial_verification_tx = Some(tx);
        }
        if let Some(block) = update.complete_on_block {
            self.complete_on_block = Some(block);
        }
        if let Some(seed) = update.random_seed {
            self.random_seed = Some(seed);
        }
        if let Some(tx) = update.complete_verification_tx {
            self.complete_verification_tx = Some(tx);
        }
        if let Some(id) = update.contract_id {
            self.contract_id = Some(id);
        }
    }
}

/// Partial update of a [`BeefyRecord`]. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeefyUpdate {
    /// New status.
    pub status: Option<BeefyStatus>,
    /// Initial verification transaction hash.
    pub initial_verification_tx: Option<B256>,
    /// Completion block.
    pub complete_on_block: Option<u64>,
    /// Random seed.
    pub random_seed: Option<B256>,
    /// Complete verification transaction hash.
    pub complete_verification_tx: Option<B256>,
    /// Light client verification id.
    pub contract_id: Option<u64>,
}

impl BeefyUpdate {
    /// Update setting only the status.
    pub fn status(status: BeefyStatus) -> Self {
        Self { status: Some(status), ..Default::default() }
    }
}

/// A command for the commitment store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum StoreCommand {
    /// Inserts or replaces a record.
    Create {
        /// The record.
        record: BeefyRecord,
    },
    /// Updates an existing record.
    Update {
        /// Key of the record.
        block_number: u64,
        /// Fields to change.
        update: BeefyUpdate,
    },
    /// Removes a record.
    Delete {
        /// Key of the record.
        block_number: u64,
    },
}

impl StoreCommand {
    /// Short name of the command, used as a metric label.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Errors raised by the commitment store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The journal could not be opened.
    #[error("failed to open journal {path}: {source}")]
    Open {
        /// Journal path.
        path: PathBuf,
        /// Cause.
        #[source]
        source: io::Error,
    },

    /// A journal write failed.
    #[error("journal write failed: {0}")]
    Journal(#[from] io::Error),

    /// A journal line could not be decoded.
    #[error("corrupt journal entry at line {line}: {source}")]
    Corrupt {
        /// 1-based line number.
        line: usize,
        /// Decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// A command could not be encoded.
    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),

    /// The in-memory state lock was poisoned.
    #[error("lock poisoned")]
    LockPoisoned,

    /// The store was started twice.
    #[error("store already started")]
    AlreadyStarted,
}

impl PartialEq for StoreError {
    fn eq(&self, other: &Self) -> bool {
        use StoreError::*;
        match (self, other) {
            (Open { path: a, .. }, Open { path: b, .. }) => a == b,
            (Journal(a), Journal(b)) => a.kind() == b.kind(),
            (Corrupt { line: a, .. }, Corrupt { line: b, .. }) => a == b,
            (Encode(a), Encode(b)) => a.to_string() == b.to_string(),
            (LockPoisoned, LockPoisoned) | (AlreadyStarted, AlreadyStarted) => true,
            _ => false,
        }
    }
}

/// The persistence store behind the commitment channel.
#[async_trait]
pub trait CommitmentStore: Send + Debug {
    /// Spawns the store worker into `tasks`.
    ///
    /// Fails if the store cannot be opened; the relay does not start any adapter then.
    async fn start(&mut self, tasks: &mut TaskGroup) -> Result<(), StoreError>;
}
