// Proof verification boundary.
//
// The zero-knowledge proof system is an external collaborator. The engine
// supplies the expected membership root, the poll id as the proof scope and
// the chosen option index as the signal; the verifier either extracts the
// nullifier embedded in the proof or rejects with a typed reason. Nothing in
// the engine inspects proof internals beyond this contract.
//
// SAFETY INVARIANTS:
// 1. Scope binding: a proof for poll A can never be replayed in poll B.
// 2. Signal binding: an accepted proof attests to one specific option and
//    cannot be reattributed to another after the fact.
// 3. Root currency: a proof built against a stale membership root is
//    rejected, never silently accepted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{MerkleRoot, Nullifier, PollId, TreeDepth};

/// A membership-and-intent proof as submitted by a voter.
///
/// The embedded depth, root and nullifier are claims made by the prover; the
/// verifier checks them against the expected values in the
/// [`VerificationContext`] before accepting. `points` carries the opaque
/// proof encoding (eight curve points in the reference system).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipProof {
    pub merkle_tree_depth: u8,
    pub merkle_tree_root: MerkleRoot,
    pub nullifier: Nullifier,
    pub points: Vec<u8>,
}

/// Expected public inputs for one vote attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationContext {
    /// Current root of the poll's membership group.
    pub merkle_root: MerkleRoot,
    /// Poll id; isolates nullifiers between polls.
    pub scope: PollId,
    /// Selected option index.
    pub signal: u64,
    /// Structural depth the proof must have been generated for.
    pub tree_depth: TreeDepth,
}

/// Why a proof was rejected. All reasons are terminal for the attempt; the
/// voter must regenerate a fresh proof (against the current root if the old
/// one went stale).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProofRejection {
    /// The proof encoding could not be parsed.
    #[error("malformed proof")]
    Malformed,

    /// The root embedded in the proof does not match the group's current root.
    #[error("merkle root mismatch")]
    RootMismatch,

    /// The proof was generated for a different tree depth.
    #[error("tree depth mismatch")]
    DepthMismatch,

    /// The proof failed cryptographic verification.
    #[error("proof verification failed")]
    Invalid,
}

/// Contract the engine holds against the external proof system.
///
/// Implementations may take seconds per call; the registry therefore never
/// invokes `verify` while holding a poll lock.
pub trait ProofVerifier: Send + Sync {
    fn verify(
        &self,
        proof: &MembershipProof,
        context: &VerificationContext,
    ) -> Result<Nullifier, ProofRejection>;
}

/// Structural verifier with no cryptography, mirroring the mock verifier
/// contract the reference deployment tests against. It enforces the parts of
/// the contract the engine can observe (root currency, depth, non-empty
/// encoding) and trusts the embedded nullifier.
///
/// Suitable for tests and local development only.
#[derive(Debug, Clone, Default)]
pub struct MockVerifier {
    /// When set, every structurally valid proof is still rejected as
    /// cryptographically invalid. Exercises the failure path.
    pub reject_all: bool,
}

impl MockVerifier {
    pub fn new() -> Self {
        MockVerifier { reject_all: false }
    }

    pub fn rejecting() -> Self {
        MockVerifier { reject_all: true }
    }
}

impl ProofVerifier for MockVerifier {
    fn verify(
        &self,
        proof: &MembershipProof,
        context: &VerificationContext,
    ) -> Result<Nullifier, ProofRejection> {
        if proof.points.is_empty() {
            return Err(ProofRejection::Malformed);
        }
        if proof.merkle_tree_depth != context.tree_depth.as_u8() {
            return Err(ProofRejection::DepthMismatch);
        }
        if proof.merkle_tree_root != context.merkle_root {
            return Err(ProofRejection::RootMismatch);
        }
        if self.reject_all {
            return Err(ProofRejection::Invalid);
        }
        Ok(proof.nullifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> VerificationContext {
        VerificationContext {
            merkle_root: MerkleRoot::from_bytes([7u8; 32]),
            scope: 0,
            signal: 0,
            tree_depth: TreeDepth::Depth20,
        }
    }

    fn proof() -> MembershipProof {
        MembershipProof {
            merkle_tree_depth: 20,
            merkle_tree_root: MerkleRoot::from_bytes([7u8; 32]),
            nullifier: Nullifier::from_u64(42),
            points: vec![1, 2, 3],
        }
    }

    #[test]
    fn mock_verifier_accepts_matching_proof() {
        let verifier = MockVerifier::new();
        let nullifier = verifier.verify(&proof(), &context()).unwrap();
        assert_eq!(nullifier, Nullifier::from_u64(42));
    }

    #[test]
    fn mock_verifier_rejects_empty_encoding() {
        let mut p = proof();
        p.points.clear();
        assert_eq!(
            MockVerifier::new().verify(&p, &context()),
            Err(ProofRejection::Malformed)
        );
    }

    #[test]
    fn mock_verifier_rejects_depth_mismatch() {
        let mut p = proof();
        p.merkle_tree_depth = 16;
        assert_eq!(
            MockVerifier::new().verify(&p, &context()),
            Err(ProofRejection::DepthMismatch)
        );
    }

    #[test]
    fn mock_verifier_rejects_stale_root() {
        let mut p = proof();
        p.merkle_tree_root = MerkleRoot::from_bytes([9u8; 32]);
        assert_eq!(
            MockVerifier::new().verify(&p, &context()),
            Err(ProofRejection::RootMismatch)
        );
    }

    #[test]
    fn rejecting_verifier_fails_cryptographically() {
        assert_eq!(
            MockVerifier::rejecting().verify(&proof(), &context()),
            Err(ProofRejection::Invalid)
        );
    }
}
