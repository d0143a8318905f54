// Core value types shared across the polling engine.
//
// Commitments, nullifiers and Merkle roots are 256-bit-class integers in the
// proof system; the engine treats them as opaque 32-byte values and never
// inspects their field structure.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential poll identifier, assigned monotonically from zero.
pub type PollId = u64;

/// Unix timestamp in seconds, always supplied by the caller.
pub type Timestamp = u64;

/// A registered voter's public identity commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment(pub [u8; 32]);

impl Commitment {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Commitment(bytes)
    }

    /// Build a commitment from a small integer, big-endian padded.
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Commitment(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// The per-(identity, poll) value revealed by a membership proof, recorded to
/// detect vote reuse without revealing which identity voted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nullifier(pub [u8; 32]);

impl Nullifier {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Nullifier(bytes)
    }

    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Nullifier(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Nullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Digest summarizing the ordered set of registered identity commitments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MerkleRoot(pub [u8; 32]);

impl MerkleRoot {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        MerkleRoot(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for MerkleRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Supported membership tree depths.
///
/// The depth fixes the maximum number of registrable identities and the
/// structural parameter a proof must match. The largest option deliberately
/// caps capacity at 2^32 - 1 rather than 2^32, matching the published limits
/// of the reference deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeDepth {
    Depth16,
    Depth20,
    Depth24,
    Depth32,
}

impl TreeDepth {
    /// Parse a raw depth value, returning `None` for unsupported depths.
    pub fn from_u8(depth: u8) -> Option<Self> {
        match depth {
            16 => Some(TreeDepth::Depth16),
            20 => Some(TreeDepth::Depth20),
            24 => Some(TreeDepth::Depth24),
            32 => Some(TreeDepth::Depth32),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            TreeDepth::Depth16 => 16,
            TreeDepth::Depth20 => 20,
            TreeDepth::Depth24 => 24,
            TreeDepth::Depth32 => 32,
        }
    }

    /// Maximum number of identity commitments a group of this depth accepts.
    pub fn capacity(self) -> u64 {
        match self {
            TreeDepth::Depth16 => 1 << 16,
            TreeDepth::Depth20 => 1 << 20,
            TreeDepth::Depth24 => 1 << 24,
            TreeDepth::Depth32 => u32::MAX as u64,
        }
    }
}
