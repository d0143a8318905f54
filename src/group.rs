// Membership group: append-only incremental Merkle tree of identity
// commitments.
//
// The tree has a fixed depth chosen at poll creation. Empty subtrees are
// represented by precomputed zero hashes, so insertion touches one node per
// level and the root is available in O(1). Two groups fed the same
// commitment sequence always produce the same root; the root is the public
// anchor every later membership proof must match.

use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::error::{PollError, PollResult};
use crate::types::{Commitment, MerkleRoot, TreeDepth};

fn hash_leaf(commitment: &Commitment) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(commitment.as_bytes());
    hasher.finalize().into()
}

fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

#[derive(Debug, Clone)]
pub struct MembershipGroup {
    depth: u8,
    capacity: u64,
    /// zero_hashes[i] is the digest of an empty subtree of height i.
    zero_hashes: Vec<[u8; 32]>,
    /// Left sibling retained at each level for the next insertion.
    filled_subtrees: Vec<[u8; 32]>,
    /// Commitments in registration order; also the proof-construction data
    /// source exposed to off-core provers.
    members: Vec<Commitment>,
    /// Populated only when duplicate registration is configured as rejected.
    seen: Option<HashSet<Commitment>>,
    root: [u8; 32],
}

impl MembershipGroup {
    pub fn new(depth: TreeDepth, reject_duplicates: bool) -> Self {
        Self::with_parameters(depth.as_u8(), depth.capacity(), reject_duplicates)
    }

    pub(crate) fn with_parameters(depth: u8, capacity: u64, reject_duplicates: bool) -> Self {
        let mut zero_hashes = Vec::with_capacity(depth as usize + 1);
        zero_hashes.push([0u8; 32]);
        for level in 0..depth as usize {
            let z = zero_hashes[level];
            zero_hashes.push(hash_pair(&z, &z));
        }
        let filled_subtrees = zero_hashes[..depth as usize].to_vec();
        let root = zero_hashes[depth as usize];
        MembershipGroup {
            depth,
            capacity,
            zero_hashes,
            filled_subtrees,
            members: Vec::new(),
            seen: reject_duplicates.then(HashSet::new),
            root,
        }
    }

    /// Append a commitment as the next leaf and return the new root.
    pub fn insert(&mut self, commitment: Commitment) -> PollResult<MerkleRoot> {
        if self.members.len() as u64 >= self.capacity {
            return Err(PollError::CapacityExceeded);
        }
        if let Some(seen) = &self.seen {
            if seen.contains(&commitment) {
                return Err(PollError::DuplicateCommitment);
            }
        }

        let mut index = self.members.len() as u64;
        let mut node = hash_leaf(&commitment);
        for level in 0..self.depth as usize {
            if index % 2 == 0 {
                self.filled_subtrees[level] = node;
                node = hash_pair(&node, &self.zero_hashes[level]);
            } else {
                node = hash_pair(&self.filled_subtrees[level], &node);
            }
            index /= 2;
        }
        self.root = node;

        self.members.push(commitment);
        if let Some(seen) = &mut self.seen {
            seen.insert(commitment);
        }
        Ok(MerkleRoot(self.root))
    }

    pub fn root(&self) -> MerkleRoot {
        MerkleRoot(self.root)
    }

    pub fn size(&self) -> u64 {
        self.members.len() as u64
    }

    /// Ordered commitments, oldest first. Off-core provers reconstruct the
    /// group from this sequence to produce a proof matching `root()`.
    pub fn members(&self) -> &[Commitment] {
        &self.members
    }
}
