//! Merkle proofs of parachain head inclusion.
//!
//! The relay chain commits to the heads of all of its parachains with a binary merkle tree. To
//! convince the Ethereum-side light client that a parachain reached a given head, the relay
//! submits the head together with its inclusion proof against that commitment.
//!
//! - [`tree`] holds the generic tree primitives (root, proof, verification).
//! - [`build_parachain_proof`] turns a set of parachain heads into a [`MerkleProofBundle`].

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod tree;
pub use tree::{Keccak256, MerkleHasher, MerkleProof, Position, ProofNode};

mod para;
pub use para::{
    MerkleProofBundle, ParaHead, ParaId, build_parachain_proof, build_proof_from_heads,
};

mod error;
pub use error::MerkleError;
