use std::{collections::HashMap, fmt};

use alloy_primitives::{B256, Bytes};
use codec::Encode;
use serde::{Deserialize, Serialize};

use crate::{
    Keccak256, MerkleError, MerkleHasher,
    tree::{hash_leaves, merkle_proof, verify_proof},
};

/// Identifier of a parachain on its relay chain.
pub type ParaId = u32;

/// Head of a parachain as committed to by the relay chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaHead {
    /// Parachain identifier.
    pub para_id: ParaId,
    /// Block number of the head. Not part of the leaf.
    #[serde(default)]
    pub number: u64,
    /// SCALE encoded parachain header.
    pub data: Bytes,
}

#[derive(Encode)]
struct LeafPreImage<'a> {
    para_id: ParaId,
    head_data: &'a [u8],
}

impl ParaHead {
    /// Creates a new [`ParaHead`].
    pub fn new(para_id: ParaId, number: u64, data: impl Into<Bytes>) -> Self {
        Self { para_id, number, data: data.into() }
    }

    /// SCALE encodes `(para_id, head_data)`, the pre-image of this head's leaf.
    pub fn encode_leaf(&self) -> Vec<u8> {
        LeafPreImage { para_id: self.para_id, head_data: self.data.as_ref() }.encode()
    }
}

/// Proof that one parachain head is part of the relay chain's head commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleProofBundle {
    /// Encoded heads in commitment order.
    pub pre_leaves: Vec<Bytes>,
    /// Number of leaves in the tree.
    pub number_of_leaves: u64,
    /// Encoded head being proven.
    pub proven_pre_leaf: Bytes,
    /// Leaf digest of the proven head.
    pub proven_leaf: B256,
    /// Position of the proven head in commitment order.
    pub proven_leaf_index: u64,
    /// Root of the head commitment.
    pub root: B256,
    /// Sibling digests, leaf level first.
    pub proof: Vec<B256>,
}

impl MerkleProofBundle {
    /// Checks the bundle is internally consistent and that its proof opens to its root.
    pub fn verify(&self) -> Result<(), MerkleError> {
        let invalid = || MerkleError::InvalidProof(self.root);

        let len = self.pre_leaves.len();
        if len as u64 != self.number_of_leaves {
            return Err(invalid());
        }
        let index = usize::try_from(self.proven_leaf_index).map_err(|_| invalid())?;
        if self.pre_leaves.get(index) != Some(&self.proven_pre_leaf) {
            return Err(invalid());
        }
        if Keccak256::hash(&self.proven_pre_leaf) != self.proven_leaf {
            return Err(invalid());
        }
        if !verify_proof::<Keccak256>(&self.root, &self.proof, len, index, &self.proven_leaf) {
            return Err(invalid());
        }
        Ok(())
    }
}

impl fmt::Display for MerkleProofBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Builds the inclusion proof of `target` over the given head set.
///
/// Heads are ordered by ascending parachain id before they are committed to, so the result does
/// not depend on the iteration order of `heads`.
pub fn build_parachain_proof(
    heads: &HashMap<ParaId, ParaHead>,
    target: ParaId,
) -> Result<MerkleProofBundle, MerkleError> {
    build_proof_from_heads(heads.values(), target)
}

/// Same as [`build_parachain_proof`] over any collection of heads.
pub fn build_proof_from_heads<'a>(
    heads: impl IntoIterator<Item = &'a ParaHead>,
    target: ParaId,
) -> Result<MerkleProofBundle, MerkleError> {
    let mut sorted: Vec<&ParaHead> = heads.into_iter().collect();
    sorted.sort_by(|a, b| a.para_id.cmp(&b.para_id).then_with(|| a.data.cmp(&b.data)));

    let index = sorted
        .iter()
        .position(|head| head.para_id == target)
        .ok_or(MerkleError::TargetNotFound(target))?;

    let pre_leaves: Vec<Bytes> = sorted.iter().map(|head| head.encode_leaf().into()).collect();
    let leaves = hash_leaves::<Keccak256, _>(&pre_leaves);
    let proof = merkle_proof::<Keccak256>(&leaves, index)?;

    Ok(MerkleProofBundle {
        number_of_leaves: pre_leaves.len() as u64,
        proven_pre_leaf: pre_leaves[index].clone(),
        proven_leaf: proof.leaf,
        proven_leaf_index: index as u64,
        root: proof.root,
        proof: proof.hashes(),
        pre_leaves,
    })
}
