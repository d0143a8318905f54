// Poll records and creation-time validation.
//
// A poll's identity, wording, admin, timing and tree depth are fixed at
// creation and never change; only the tally and membership evolve, and those
// live with the registry's per-poll state so readers of the immutable record
// need no lock.

use serde::{Deserialize, Serialize};

use crate::error::{PollError, PollResult};
use crate::phase::{phase_at, PollPhase};
use crate::types::{PollId, Timestamp, TreeDepth};

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_OPTION_LEN: usize = 100;

/// Caller-supplied inputs for creating a poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollParams {
    pub title: String,
    pub options: Vec<String>,
    pub admin: String,
    /// Seconds the registration phase stays open.
    pub registration_duration: u64,
    /// Seconds the voting phase stays open after registration closes.
    pub voting_duration: u64,
    /// Raw tree depth; must be one of the supported values.
    pub tree_depth: u8,
}

/// Immutable record of one poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub title: String,
    pub options: Vec<String>,
    pub admin: String,
    pub created_at: Timestamp,
    pub registration_ends_at: Timestamp,
    pub voting_ends_at: Timestamp,
    pub tree_depth: TreeDepth,
}

impl Poll {
    /// Validate `params` against the configured duration bounds and build the
    /// record. `min_duration` and `max_duration` apply to each phase
    /// independently.
    pub fn create(
        id: PollId,
        params: PollParams,
        min_duration: u64,
        max_duration: u64,
        now: Timestamp,
    ) -> PollResult<Poll> {
        let option_count = params.options.len();
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&option_count) {
            return Err(PollError::InvalidOptionCount);
        }
        let title_len = params.title.chars().count();
        if title_len == 0 || title_len > MAX_TITLE_LEN {
            return Err(PollError::InvalidTitle);
        }
        for option in &params.options {
            let len = option.chars().count();
            if len == 0 || len > MAX_OPTION_LEN {
                return Err(PollError::InvalidOptionText);
            }
        }
        let tree_depth =
            TreeDepth::from_u8(params.tree_depth).ok_or(PollError::InvalidTreeDepth)?;
        for duration in [params.registration_duration, params.voting_duration] {
            if duration < min_duration || duration > max_duration {
                return Err(PollError::InvalidDuration);
            }
        }

        let registration_ends_at = now
            .checked_add(params.registration_duration)
            .ok_or(PollError::InvalidDuration)?;
        let voting_ends_at = registration_ends_at
            .checked_add(params.voting_duration)
            .ok_or(PollError::InvalidDuration)?;

        Ok(Poll {
            id,
            title: params.title,
            options: params.options,
            admin: params.admin,
            created_at: now,
            registration_ends_at,
            voting_ends_at,
            tree_depth,
        })
    }

    pub fn phase_at(&self, now: Timestamp) -> PollPhase {
        phase_at(self.registration_ends_at, self.voting_ends_at, now)
    }
}

/// Point-in-time snapshot of a poll's public record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollInfo {
    pub id: PollId,
    pub title: String,
    pub options: Vec<String>,
    pub admin: String,
    pub created_at: Timestamp,
    pub registration_ends_at: Timestamp,
    pub voting_ends_at: Timestamp,
    pub tree_depth: TreeDepth,
    pub total_votes: u64,
}

/// Point-in-time snapshot of a poll's tally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResults {
    pub poll_id: PollId,
    pub options: Vec<String>,
    pub vote_counts: Vec<u64>,
    pub total_votes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: u64 = 60;
    const MAX: u64 = 30 * 24 * 3600;

    fn params() -> PollParams {
        PollParams {
            title: "Favorite language?".into(),
            options: vec!["Rust".into(), "Go".into(), "Zig".into()],
            admin: "0xadmin".into(),
            registration_duration: 3_600,
            voting_duration: 7_200,
            tree_depth: 20,
        }
    }

    #[test]
    fn valid_params_produce_ordered_timestamps() {
        let poll = Poll::create(0, params(), MIN, MAX, 1_000).unwrap();
        assert_eq!(poll.created_at, 1_000);
        assert_eq!(poll.registration_ends_at, 4_600);
        assert_eq!(poll.voting_ends_at, 11_800);
        assert!(poll.created_at < poll.registration_ends_at);
        assert!(poll.registration_ends_at < poll.voting_ends_at);
        assert_eq!(poll.tree_depth, TreeDepth::Depth20);
    }

    #[test]
    fn option_count_bounds_are_enforced() {
        for count in [0usize, 1, 11] {
            let mut p = params();
            p.options = (0..count).map(|i| format!("opt-{i}")).collect();
            assert_eq!(
                Poll::create(0, p, MIN, MAX, 1_000),
                Err(PollError::InvalidOptionCount)
            );
        }
    }

    #[test]
    fn unsupported_tree_depths_are_rejected() {
        for depth in [0u8, 15, 33] {
            let mut p = params();
            p.tree_depth = depth;
            assert_eq!(
                Poll::create(0, p, MIN, MAX, 1_000),
                Err(PollError::InvalidTreeDepth)
            );
        }
    }

    #[test]
    fn durations_outside_bounds_are_rejected() {
        let mut p = params();
        p.registration_duration = MIN - 1;
        assert_eq!(
            Poll::create(0, p, MIN, MAX, 1_000),
            Err(PollError::InvalidDuration)
        );

        let mut p = params();
        p.voting_duration = MAX + 1;
        assert_eq!(
            Poll::create(0, p, MIN, MAX, 1_000),
            Err(PollError::InvalidDuration)
        );
    }

    #[test]
    fn oversized_title_is_rejected() {
        let mut p = params();
        p.title = "x".repeat(MAX_TITLE_LEN + 1);
        assert_eq!(
            Poll::create(0, p, MIN, MAX, 1_000),
            Err(PollError::InvalidTitle)
        );
    }

    #[test]
    fn oversized_option_text_is_rejected() {
        let mut p = params();
        p.options[1] = "y".repeat(MAX_OPTION_LEN + 1);
        assert_eq!(
            Poll::create(0, p, MIN, MAX, 1_000),
            Err(PollError::InvalidOptionText)
        );
    }

    #[test]
    fn poll_phase_follows_its_timestamps() {
        let poll = Poll::create(0, params(), MIN, MAX, 1_000).unwrap();
        assert_eq!(poll.phase_at(1_000), PollPhase::Registration);
        assert_eq!(poll.phase_at(poll.registration_ends_at), PollPhase::Voting);
        assert_eq!(poll.phase_at(poll.voting_ends_at), PollPhase::Ended);
    }
}
