use thiserror::Error;

use crate::ParaId;

/// Errors raised while building or checking merkle proofs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MerkleError {
    /// The requested parachain is not part of the head set.
    #[error("parachain {0} not found in head set")]
    TargetNotFound(ParaId),

    /// A proof was requested over zero leaves.
    #[error("cannot build a proof over an empty tree")]
    EmptyTree,

    /// The leaf index does not address a leaf of the tree.
    #[error("leaf index {index} out of bounds for {len} leaves")]
    LeafIndexOutOfBounds {
        /// Requested index.
        index: usize,
        /// Number of leaves.
        len: usize,
    },

    /// The bundle does not verify against its own root.
    #[error("proof does not verify against root {0}")]
    InvalidProof(alloy_primitives::B256),
}
