//! Values exchanged between chain adapters.

use alloy_primitives::{B256, Bytes};
use bridge_merkle::MerkleProofBundle;
use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};

/// A finalized head observed on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Constructor, Display, Serialize, Deserialize)]
#[display("head(chain: {chain_id}, number: {number}, hash: {hash})")]
#[serde(rename_all = "camelCase")]
pub struct HeadRecord {
    /// Chain identifier, the parachain id on the substrate side.
    pub chain_id: u32,
    /// Block height.
    pub number: u64,
    /// Block hash.
    pub hash: B256,
    /// Encoded header, the leaf pre-image input.
    pub payload: Bytes,
}

/// A head travelling on a head channel, with the inclusion evidence the destination light client
/// needs to accept it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// The finalized head.
    pub head: HeadRecord,
    /// Inclusion proof against a relay chain commitment, if the head is a parachain head.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<MerkleProofBundle>,
}

impl Header {
    /// Creates a header without evidence.
    pub const fn new(head: HeadRecord) -> Self {
        Self { head, evidence: None }
    }

    /// Attaches inclusion evidence.
    pub fn with_evidence(mut self, evidence: MerkleProofBundle) -> Self {
        self.evidence = Some(evidence);
        self
    }
}

/// A single cross-chain message.
#[derive(Debug, Clone, PartialEq, Eq, Constructor, Serialize, Deserialize)]
pub struct Message {
    /// Channel nonce of the message.
    pub nonce: u64,
    /// Encoded message and its proof.
    pub payload: Bytes,
}

/// Messages finalized under one head of the source chain.
#[derive(Debug, Clone, PartialEq, Eq, Constructor, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBatch {
    /// Number of the head the messages were finalized under.
    pub head_number: u64,
    /// Hash of that head.
    pub head_hash: B256,
    /// Messages in submission order.
    pub messages: Vec<Message>,
}

impl MessageBatch {
    /// Returns true if this batch depends on the given head.
    pub fn belongs_to(&self, head: &HeadRecord) -> bool {
        self.head_number == head.number && self.head_hash == head.hash
    }
}

/// Opaque value exchanged once between the two adapters before steady-state relay starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Init(pub Bytes);

impl From<Bytes> for Init {
    fn from(value: Bytes) -> Self {
        Self(value)
    }
}
