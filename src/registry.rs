// Poll registry: the orchestrating state machine.
//
// The registry owns every poll together with its membership group and
// nullifier ledger. Polls are append-only historical records; only the tally
// and the membership/nullifier sets ever change after creation.
//
// SAFETY INVARIANTS:
// 1. Mutations on one poll are serialized by that poll's lock; operations on
//    different polls never contend.
// 2. Proof verification runs outside every lock. Reads are never blocked by
//    a slow verifier.
// 3. The nullifier check, nullifier insert and tally increment form one
//    critical section: of N concurrent votes carrying the same nullifier,
//    exactly one succeeds and the rest observe VoteAlreadyCast.
// 4. Phase is recomputed from stored timestamps and the caller's clock on
//    every call, never cached.
// 5. Journal events for one poll are recorded in commit order: the event is
//    emitted before the lock guarding the mutation is released.

use dashmap::DashMap;
use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{PollError, PollResult};
use crate::group::MembershipGroup;
use crate::journal::{EventSink, PollEvent};
use crate::nullifier::{InsertOutcome, NullifierLedger};
use crate::phase::PollPhase;
use crate::poll::{Poll, PollInfo, PollParams, PollResults};
use crate::types::{Commitment, MerkleRoot, Nullifier, PollId, Timestamp};
use crate::verifier::{MembershipProof, ProofRejection, ProofVerifier, VerificationContext};

/// Tunable policy knobs. Defaults match the reference deployment: phases run
/// from one minute to thirty days, and registering the same identity
/// commitment twice is permitted (a duplicate leaf cannot vote twice anyway,
/// since both leaves share one nullifier per poll).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Minimum length of each phase, in seconds.
    pub min_phase_duration: u64,
    /// Maximum length of each phase, in seconds.
    pub max_phase_duration: u64,
    /// Reject a commitment that is already a member of the poll's group.
    pub reject_duplicate_commitments: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            min_phase_duration: 60,
            max_phase_duration: 30 * 24 * 3600,
            reject_duplicate_commitments: false,
        }
    }
}

/// Mutable half of a poll, guarded by the per-poll lock.
struct PollState {
    group: MembershipGroup,
    ledger: NullifierLedger,
    tally: Vec<u64>,
    total_votes: u64,
}

struct PollEntry {
    poll: Poll,
    state: RwLock<PollState>,
}

pub struct PollRegistry {
    polls: DashMap<PollId, Arc<PollEntry>>,
    /// Next id to assign. Also serializes creation, so the published count
    /// never runs ahead of the retrievable polls.
    next_id: Mutex<PollId>,
    config: RegistryConfig,
    verifier: Arc<dyn ProofVerifier>,
    journal: Option<Arc<dyn EventSink>>,
}

impl PollRegistry {
    pub fn new(verifier: Arc<dyn ProofVerifier>) -> Self {
        Self::with_config(verifier, RegistryConfig::default())
    }

    pub fn with_config(verifier: Arc<dyn ProofVerifier>, config: RegistryConfig) -> Self {
        PollRegistry {
            polls: DashMap::new(),
            next_id: Mutex::new(0),
            config,
            verifier,
            journal: None,
        }
    }

    /// Attach an event sink. Every successful mutation is recorded before the
    /// call returns; rejected operations are not.
    pub fn with_journal(mut self, journal: Arc<dyn EventSink>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn entry(&self, poll_id: PollId) -> PollResult<Arc<PollEntry>> {
        self.polls
            .get(&poll_id)
            .map(|e| Arc::clone(e.value()))
            .ok_or(PollError::PollDoesNotExist)
    }

    fn emit(&self, event: PollEvent) {
        if let Some(journal) = &self.journal {
            journal.record(&event);
        }
    }

    /// Create a poll. Allocates the next sequential id, computes the phase
    /// boundaries from `now` and initializes an empty group, ledger and
    /// tally.
    pub fn create_poll(&self, params: PollParams, now: Timestamp) -> PollResult<PollId> {
        // Id allocation, validation and publication share one lock: rejected
        // calls leave no id gap, and an id counted by `poll_count` is always
        // already retrievable.
        let mut next_id = self.next_id.lock();
        let id = *next_id;
        let poll = Poll::create(
            id,
            params,
            self.config.min_phase_duration,
            self.config.max_phase_duration,
            now,
        )?;

        let option_count = poll.options.len();
        let state = PollState {
            group: MembershipGroup::new(
                poll.tree_depth,
                self.config.reject_duplicate_commitments,
            ),
            ledger: NullifierLedger::new(),
            tally: vec![0; option_count],
            total_votes: 0,
        };

        info!(
            "poll {} created: {} options, registration until {}, voting until {}",
            id, option_count, poll.registration_ends_at, poll.voting_ends_at
        );
        self.emit(PollEvent::PollCreated {
            poll_id: id,
            title: poll.title.clone(),
            admin: poll.admin.clone(),
            registration_ends_at: poll.registration_ends_at,
            voting_ends_at: poll.voting_ends_at,
            tree_depth: poll.tree_depth.as_u8(),
        });
        self.polls.insert(
            id,
            Arc::new(PollEntry {
                poll,
                state: RwLock::new(state),
            }),
        );
        *next_id += 1;
        Ok(id)
    }

    /// Register an identity commitment as a member of the poll's group.
    /// Allowed only while the poll is in its registration phase.
    pub fn register_voter(
        &self,
        poll_id: PollId,
        commitment: Commitment,
        now: Timestamp,
    ) -> PollResult<()> {
        let entry = self.entry(poll_id)?;
        if entry.poll.phase_at(now) != PollPhase::Registration {
            return Err(PollError::NotInRegistrationPhase);
        }

        let root = {
            let mut state = entry.state.write();
            let root = state.group.insert(commitment)?;
            // Emitted before the lock is released so journal order matches
            // leaf insertion order; a replayer reproduces the root.
            self.emit(PollEvent::VoterRegistered {
                poll_id,
                commitment,
                merkle_root: root,
            });
            root
        };

        debug!("poll {poll_id}: registered {commitment}, new root {root}");
        Ok(())
    }

    /// Admit one anonymous vote.
    ///
    /// Verification runs against a snapshot of the group root taken under a
    /// short read lock; no lock is held while the (potentially slow) verifier
    /// executes. The final ledger-check-and-increment happens under the write
    /// lock, with the root rechecked so a registration racing the phase
    /// boundary can never let a stale proof through.
    pub fn cast_vote(
        &self,
        poll_id: PollId,
        option_index: u64,
        proof: &MembershipProof,
        now: Timestamp,
    ) -> PollResult<()> {
        let entry = self.entry(poll_id)?;
        let poll = &entry.poll;
        if poll.phase_at(now) != PollPhase::Voting {
            return Err(PollError::NotInVotingPhase);
        }
        if option_index >= poll.options.len() as u64 {
            return Err(PollError::InvalidVoteOption);
        }

        let expected_root = entry.state.read().group.root();
        let context = VerificationContext {
            merkle_root: expected_root,
            scope: poll_id,
            signal: option_index,
            tree_depth: poll.tree_depth,
        };
        let nullifier = self
            .verifier
            .verify(proof, &context)
            .map_err(PollError::InvalidProof)?;

        {
            let mut state = entry.state.write();
            if state.group.root() != expected_root {
                return Err(PollError::InvalidProof(ProofRejection::RootMismatch));
            }
            if state.ledger.contains(&nullifier) {
                return Err(PollError::VoteAlreadyCast);
            }
            let outcome = state.ledger.insert(nullifier);
            debug_assert_eq!(outcome, InsertOutcome::Inserted);
            state.tally[option_index as usize] += 1;
            state.total_votes += 1;
            // Same ordering rule as registration: journal in commit order.
            self.emit(PollEvent::VoteCast {
                poll_id,
                option_index,
                nullifier,
            });
        }

        info!("poll {poll_id}: vote recorded for option {option_index}, nullifier {nullifier}");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read surface. Side-effect free, safe to poll repeatedly.
    // ------------------------------------------------------------------

    /// Number of polls ever created; also the next id to be assigned. Every
    /// id below the returned count is retrievable.
    pub fn poll_count(&self) -> u64 {
        *self.next_id.lock()
    }

    pub fn poll_info(&self, poll_id: PollId) -> PollResult<PollInfo> {
        let entry = self.entry(poll_id)?;
        let total_votes = entry.state.read().total_votes;
        let poll = &entry.poll;
        Ok(PollInfo {
            id: poll.id,
            title: poll.title.clone(),
            options: poll.options.clone(),
            admin: poll.admin.clone(),
            created_at: poll.created_at,
            registration_ends_at: poll.registration_ends_at,
            voting_ends_at: poll.voting_ends_at,
            tree_depth: poll.tree_depth,
            total_votes,
        })
    }

    pub fn results(&self, poll_id: PollId) -> PollResult<PollResults> {
        let entry = self.entry(poll_id)?;
        let state = entry.state.read();
        Ok(PollResults {
            poll_id,
            options: entry.poll.options.clone(),
            vote_counts: state.tally.clone(),
            total_votes: state.total_votes,
        })
    }

    pub fn phase(&self, poll_id: PollId, now: Timestamp) -> PollResult<PollPhase> {
        Ok(self.entry(poll_id)?.poll.phase_at(now))
    }

    pub fn merkle_root(&self, poll_id: PollId) -> PollResult<MerkleRoot> {
        Ok(self.entry(poll_id)?.state.read().group.root())
    }

    pub fn registered_voter_count(&self, poll_id: PollId) -> PollResult<u64> {
        Ok(self.entry(poll_id)?.state.read().group.size())
    }

    /// Ordered commitment list for off-core proof construction.
    pub fn group_members(&self, poll_id: PollId) -> PollResult<Vec<Commitment>> {
        Ok(self.entry(poll_id)?.state.read().group.members().to_vec())
    }

    pub fn is_nullifier_used(&self, poll_id: PollId, nullifier: &Nullifier) -> PollResult<bool> {
        Ok(self.entry(poll_id)?.state.read().ledger.contains(nullifier))
    }

    // ------------------------------------------------------------------
    // Wall-clock convenience wrappers.
    // ------------------------------------------------------------------

    fn unix_now() -> Timestamp {
        chrono::Utc::now().timestamp().max(0) as Timestamp
    }

    pub fn create_poll_now(&self, params: PollParams) -> PollResult<PollId> {
        self.create_poll(params, Self::unix_now())
    }

    pub fn register_voter_now(&self, poll_id: PollId, commitment: Commitment) -> PollResult<()> {
        self.register_voter(poll_id, commitment, Self::unix_now())
    }

    pub fn cast_vote_now(
        &self,
        poll_id: PollId,
        option_index: u64,
        proof: &MembershipProof,
    ) -> PollResult<()> {
        self.cast_vote(poll_id, option_index, proof, Self::unix_now())
    }

    pub fn phase_now(&self, poll_id: PollId) -> PollResult<PollPhase> {
        self.phase(poll_id, Self::unix_now())
    }
}
