//! Anonymous, replay-resistant polling engine.
//!
//! Eligible participants register an identity commitment during a poll's
//! registration window; once voting opens they cast exactly one vote each,
//! accompanied by a zero-knowledge membership-and-intent proof, without
//! revealing which registered identity cast it. Anyone can verify that every
//! counted vote came from a registered, not-yet-used identity.
//!
//! The proof system itself is an external collaborator consumed through the
//! [`verifier::ProofVerifier`] trait; this crate owns the poll lifecycle
//! state machine, the membership tree, the nullifier ledger and the
//! concurrent-safe vote admission pipeline.

pub mod error;
pub mod group;
pub mod journal;
pub mod nullifier;
pub mod phase;
pub mod poll;
pub mod registry;
pub mod types;
pub mod verifier;


pub use error::{PollError, PollResult};
pub use group::MembershipGroup;
pub use journal::{EventSink, JsonlJournal, MemorySink, PollEvent};
pub use nullifier::{InsertOutcome, NullifierLedger};
pub use phase::{phase_at, PollPhase};
pub use poll::{Poll, PollInfo, PollParams, PollResults};
pub use registry::{PollRegistry, RegistryConfig};
pub use types::{Commitment, MerkleRoot, Nullifier, PollId, Timestamp, TreeDepth};
pub use verifier::{
    MembershipProof, MockVerifier, ProofRejection, ProofVerifier, VerificationContext,
};
