// Event journal.
//
// Every successful mutation produces exactly one event (`PollCreated`,
// `VoterRegistered`, `VoteCast`); rejected operations produce none. Events
// for one poll are recorded in commit order: the registry emits them before
// releasing the lock that guards the mutation.
//
// Sinks are pluggable. The bundled JSON-lines sink appends and flushes
// before the mutating call returns. An append failure never unwinds the
// already committed in-memory mutation; the sink retains the error for the
// embedder to inspect, so the journal is an ordered audit record whose
// completeness the embedder is responsible for monitoring.

use log::warn;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::types::{Commitment, MerkleRoot, Nullifier, PollId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PollEvent {
    PollCreated {
        poll_id: PollId,
        title: String,
        admin: String,
        registration_ends_at: Timestamp,
        voting_ends_at: Timestamp,
        tree_depth: u8,
    },
    VoterRegistered {
        poll_id: PollId,
        commitment: Commitment,
        merkle_root: MerkleRoot,
    },
    VoteCast {
        poll_id: PollId,
        option_index: u64,
        nullifier: Nullifier,
    },
}

/// Destination for poll events. Implementations must be safe to call from
/// concurrent mutating operations on different polls.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &PollEvent);
}

/// Append-only JSON-lines file sink, one event per line.
///
/// A failed append is logged and retained; [`JsonlJournal::take_error`]
/// surfaces the most recent failure so the embedder can alert or re-sync,
/// since the originating call has already committed and cannot roll back.
pub struct JsonlJournal {
    file: Mutex<File>,
    last_error: Mutex<Option<io::Error>>,
}

impl JsonlJournal {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(JsonlJournal {
            file: Mutex::new(file),
            last_error: Mutex::new(None),
        })
    }

    /// Most recent append failure, if any, clearing it.
    pub fn take_error(&self) -> Option<io::Error> {
        self.last_error.lock().take()
    }
}

impl EventSink for JsonlJournal {
    fn record(&self, event: &PollEvent) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                warn!("journal: failed to serialize event: {e}");
                *self.last_error.lock() = Some(io::Error::new(io::ErrorKind::InvalidData, e));
                return;
            }
        };
        let mut file = self.file.lock();
        if let Err(e) = writeln!(file, "{line}").and_then(|_| file.flush()) {
            warn!("journal: failed to append event: {e}");
            *self.last_error.lock() = Some(e);
        }
    }
}

/// In-memory sink, retained for inspection. Used by tests and embedders that
/// forward events themselves.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<PollEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn events(&self) -> Vec<PollEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &PollEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_retains_events_in_order() {
        let sink = MemorySink::new();
        sink.record(&PollEvent::VoteCast {
            poll_id: 0,
            option_index: 1,
            nullifier: Nullifier::from_u64(9),
        });
        sink.record(&PollEvent::VoterRegistered {
            poll_id: 0,
            commitment: Commitment::from_u64(3),
            merkle_root: MerkleRoot::from_bytes([0u8; 32]),
        });
        assert_eq!(sink.len(), 2);
        assert!(matches!(sink.events()[0], PollEvent::VoteCast { .. }));
    }

    #[test]
    fn events_round_trip_through_json() {
        let event = PollEvent::PollCreated {
            poll_id: 4,
            title: "t".into(),
            admin: "a".into(),
            registration_ends_at: 10,
            voting_ends_at: 20,
            tree_depth: 20,
        };
        let line = serde_json::to_string(&event).unwrap();
        assert!(line.contains("\"event\":\"poll_created\""));
        let back: PollEvent = serde_json::from_str(&line).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn jsonl_journal_appends_one_line_per_event() {
        let dir = std::env::temp_dir().join(format!("anonpoll-journal-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("events.jsonl");
        let _ = std::fs::remove_file(&path);

        let journal = JsonlJournal::open(&path).unwrap();
        journal.record(&PollEvent::VoteCast {
            poll_id: 1,
            option_index: 0,
            nullifier: Nullifier::from_u64(5),
        });
        journal.record(&PollEvent::VoteCast {
            poll_id: 1,
            option_index: 1,
            nullifier: Nullifier::from_u64(6),
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(journal.take_error().is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn jsonl_journal_retains_append_failures() {
        // /dev/full accepts the open but fails every write with ENOSPC.
        let journal = JsonlJournal::open("/dev/full").unwrap();
        journal.record(&PollEvent::VoteCast {
            poll_id: 0,
            option_index: 0,
            nullifier: Nullifier::from_u64(1),
        });
        let error = journal.take_error().expect("append failure retained");
        assert_eq!(error.raw_os_error(), Some(28)); // ENOSPC
        assert!(journal.take_error().is_none());
    }
}
