// Consumed-nullifier ledger, one per poll.
//
// A nullifier is derived by the proof system from (identity secret, poll id)
// so the same identity voting twice in one poll always reveals the same
// value, while its votes in other polls reveal unrelated values. The ledger
// only records and checks membership; the registry pairs `insert` with the
// tally increment in one critical section.

use std::collections::HashSet;

use crate::types::Nullifier;

/// Outcome of recording a nullifier. Insertion is idempotent: recording a
/// value twice reports `AlreadyPresent` and changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyPresent,
}

#[derive(Debug, Clone, Default)]
pub struct NullifierLedger {
    used: HashSet<Nullifier>,
}

impl NullifierLedger {
    pub fn new() -> Self {
        NullifierLedger::default()
    }

    pub fn contains(&self, nullifier: &Nullifier) -> bool {
        self.used.contains(nullifier)
    }

    pub fn insert(&mut self, nullifier: Nullifier) -> InsertOutcome {
        if self.used.insert(nullifier) {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::AlreadyPresent
        }
    }

    pub fn len(&self) -> u64 {
        self.used.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}
