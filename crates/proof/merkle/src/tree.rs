//! Binary merkle tree over an ordered list of pre-leaves.
//!
//! Leaves are the hashes of their pre-images. Parents are `H(left ‖ right)` with no sorting of
//! the pair. When a level has an odd number of nodes, the last node is promoted unchanged to the
//! next level. This matches the layout produced by Substrate's `binary_merkle_tree`, which is what
//! the on-chain light clients verify against.

use alloy_primitives::{B256, keccak256};

use crate::MerkleError;

/// A 32-byte hash function used to build the tree.
pub trait MerkleHasher {
    /// Hashes the given bytes.
    fn hash(data: &[u8]) -> B256;

    /// Hashes the concatenation of two nodes.
    fn hash_pair(left: &B256, right: &B256) -> B256 {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(left.as_slice());
        buf[32..].copy_from_slice(right.as_slice());
        Self::hash(&buf)
    }
}

/// Keccak-256, the hasher used by the Ethereum-side light client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keccak256;

impl MerkleHasher for Keccak256 {
    fn hash(data: &[u8]) -> B256 {
        keccak256(data)
    }
}

/// Which side of the running hash a sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// The sibling is the left operand.
    Left,
    /// The sibling is the right operand.
    Right,
}

/// One sibling on the path from a leaf to the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofNode {
    /// Sibling digest.
    pub hash: B256,
    /// Side the sibling is on.
    pub position: Position,
}

/// Inclusion proof for a single leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// Root of the tree.
    pub root: B256,
    /// Digest of the proven leaf.
    pub leaf: B256,
    /// Index of the proven leaf.
    pub leaf_index: usize,
    /// Total number of leaves in the tree.
    pub number_of_leaves: usize,
    /// Siblings ordered from the leaf level up to the root.
    pub nodes: Vec<ProofNode>,
}

impl MerkleProof {
    /// Returns the sibling digests without side information.
    pub fn hashes(&self) -> Vec<B256> {
        self.nodes.iter().map(|node| node.hash).collect()
    }
}

/// Hashes every pre-leaf into its leaf digest.
pub fn hash_leaves<H, L>(pre_leaves: &[L]) -> Vec<B256>
where
    H: MerkleHasher,
    L: AsRef<[u8]>,
{
    pre_leaves.iter().map(|leaf| H::hash(leaf.as_ref())).collect()
}

fn next_level<H: MerkleHasher>(level: &[B256]) -> Vec<B256> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => H::hash_pair(left, right),
            // Unpaired tail, carried up as is.
            _ => pair[0],
        })
        .collect()
}

/// Computes the root over already hashed leaves. The root of an empty tree is the zero hash.
pub fn merkle_root<H: MerkleHasher>(leaves: &[B256]) -> B256 {
    if leaves.is_empty() {
        return B256::ZERO;
    }

    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = next_level::<H>(&level);
    }
    level[0]
}

/// Builds the inclusion proof of `leaves[leaf_index]`.
pub fn merkle_proof<H: MerkleHasher>(
    leaves: &[B256],
    leaf_index: usize,
) -> Result<MerkleProof, MerkleError> {
    if leaves.is_empty() {
        return Err(MerkleError::EmptyTree);
    }
    if leaf_index >= leaves.len() {
        return Err(MerkleError::LeafIndexOutOfBounds { index: leaf_index, len: leaves.len() });
    }

    let mut nodes = Vec::new();
    let mut level = leaves.to_vec();
    let mut index = leaf_index;

    while level.len() > 1 {
        let sibling = index ^ 1;
        if let Some(hash) = level.get(sibling) {
            let position = if index % 2 == 0 { Position::Right } else { Position::Left };
            nodes.push(ProofNode { hash: *hash, position });
        }
        level = next_level::<H>(&level);
        index /= 2;
    }

    Ok(MerkleProof {
        root: level[0],
        leaf: leaves[leaf_index],
        leaf_index,
        number_of_leaves: leaves.len(),
        nodes,
    })
}

/// Verifies an inclusion proof the way an on-chain verifier does: sibling sides are derived from
/// the leaf index and the number of leaves, so the proof only carries digests.
pub fn verify_proof<H: MerkleHasher>(
    root: &B256,
    proof: &[B256],
    number_of_leaves: usize,
    leaf_index: usize,
    leaf: &B256,
) -> bool {
    if leaf_index >= number_of_leaves {
        return false;
    }

    let mut siblings = proof.iter();
    let mut hash = *leaf;
    let mut position = leaf_index;
    let mut width = number_of_leaves;

    while width > 1 {
        let promoted = position == width - 1 && width % 2 == 1;
        if !promoted {
            let Some(sibling) = siblings.next() else {
                return false;
            };
            hash = if position % 2 == 0 {
                H::hash_pair(&hash, sibling)
            } else {
                H::hash_pair(sibling, &hash)
            };
        }
        position /= 2;
        width = width.div_ceil(2);
    }

    siblings.next().is_none() && hash == *root
}

/// Verifies a path of recorded siblings against a root.
pub fn verify_path<H: MerkleHasher>(root: &B256, leaf: &B256, nodes: &[ProofNode]) -> bool {
    let computed = nodes.iter().fold(*leaf, |acc, node| match node.position {
        Position::Left => H::hash_pair(&node.hash, &acc),
        Position::Right => H::hash_pair(&acc, &node.hash),
    });
    computed == *root
}
