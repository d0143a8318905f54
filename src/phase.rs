// Poll phase computation.
//
// Phase is always a pure function of the poll's stored timestamps and the
// caller-supplied clock reading. Nothing here is cached: a long-lived process
// recomputes the phase on every call, so a stored phase can never drift from
// elapsed wall-clock time.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// The three phases every poll moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PollPhase {
    /// Identity commitments may be registered; votes are rejected.
    Registration,
    /// Membership is frozen; valid proofs are admitted as votes.
    Voting,
    /// Terminal. Results are final.
    Ended,
}

impl PollPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollPhase::Registration => "Registration",
            PollPhase::Voting => "Voting",
            PollPhase::Ended => "Ended",
        }
    }
}

impl std::fmt::Display for PollPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a clock reading onto a poll's phase.
///
/// Boundary policy: the instant equal to `registration_ends_at` already
/// belongs to `Voting`, and the instant equal to `voting_ends_at` already
/// belongs to `Ended`. For a fixed poll the result is monotonic in `now`.
pub fn phase_at(
    registration_ends_at: Timestamp,
    voting_ends_at: Timestamp,
    now: Timestamp,
) -> PollPhase {
    if now < registration_ends_at {
        PollPhase::Registration
    } else if now < voting_ends_at {
        PollPhase::Voting
    } else {
        PollPhase::Ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REG_END: Timestamp = 1_000;
    const VOTE_END: Timestamp = 3_000;

    #[test]
    fn phases_cover_the_timeline() {
        assert_eq!(phase_at(REG_END, VOTE_END, 0), PollPhase::Registration);
        assert_eq!(phase_at(REG_END, VOTE_END, 999), PollPhase::Registration);
        assert_eq!(phase_at(REG_END, VOTE_END, 1_500), PollPhase::Voting);
        assert_eq!(phase_at(REG_END, VOTE_END, 2_999), PollPhase::Voting);
        assert_eq!(phase_at(REG_END, VOTE_END, 10_000), PollPhase::Ended);
    }

    #[test]
    fn boundary_instants_belong_to_the_later_phase() {
        assert_eq!(phase_at(REG_END, VOTE_END, REG_END), PollPhase::Voting);
        assert_eq!(phase_at(REG_END, VOTE_END, VOTE_END), PollPhase::Ended);
    }

    #[test]
    fn phase_is_monotonic_in_now() {
        let mut last = phase_at(REG_END, VOTE_END, 0);
        for now in 0..4_000 {
            let current = phase_at(REG_END, VOTE_END, now);
            let rank = |p: PollPhase| match p {
                PollPhase::Registration => 0,
                PollPhase::Voting => 1,
                PollPhase::Ended => 2,
            };
            assert!(rank(current) >= rank(last));
            last = current;
        }
    }
}
