// Error taxonomy for the polling engine.
//
// Every variant is a rejection of the requested operation with no partial
// state change: validation always precedes mutation, and the nullifier/tally
// update is a single atomic step. Each variant maps to one stable signal so
// calling layers can present precise guidance ("registration closed" vs.
// "already voted").

use thiserror::Error;

use crate::verifier::ProofRejection;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PollError {
    /// A poll needs between 2 and 10 options.
    #[error("invalid option count (expected 2..=10)")]
    InvalidOptionCount,

    /// The requested membership tree depth is not one of the supported values.
    #[error("invalid tree depth (expected 16, 20, 24 or 32)")]
    InvalidTreeDepth,

    /// A phase duration falls outside the configured bounds.
    #[error("invalid phase duration")]
    InvalidDuration,

    /// The poll title is empty or exceeds the maximum length.
    #[error("invalid poll title")]
    InvalidTitle,

    /// An option label is empty or exceeds the maximum length.
    #[error("invalid option text")]
    InvalidOptionText,

    /// The poll is no longer (or not yet) accepting registrations.
    #[error("not in registration phase")]
    NotInRegistrationPhase,

    /// The poll is not currently accepting votes.
    #[error("not in voting phase")]
    NotInVotingPhase,

    /// The membership group has reached the capacity fixed by its tree depth.
    #[error("membership capacity exceeded")]
    CapacityExceeded,

    /// The commitment is already registered and the registry is configured to
    /// reject duplicates.
    #[error("identity commitment already registered")]
    DuplicateCommitment,

    /// The selected option index is out of range for this poll.
    #[error("invalid vote option")]
    InvalidVoteOption,

    /// The membership proof was rejected by the verifier.
    #[error("invalid proof: {0}")]
    InvalidProof(#[source] ProofRejection),

    /// The nullifier has already been consumed: this identity has exercised
    /// its one vote in this poll.
    #[error("vote already cast")]
    VoteAlreadyCast,

    /// No poll exists under the given identifier.
    #[error("poll does not exist")]
    PollDoesNotExist,
}

pub type PollResult<T> = Result<T, PollError>;
