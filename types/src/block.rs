//! Vote blocks: one immutable, hash-linked record per cast vote.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    CandidateId, ElectionId, Position, PreviousHash, Timestamp, VerificationCode, VoteHash,
    VoterId,
};

/// Opaque store-assigned identifier of a persisted block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(u64);

impl BlockId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a block within its election's chain, starting at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockNumber(u64);

impl BlockNumber {
    /// Number of an election's first block.
    pub const FIRST: Self = Self(1);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// The block this one must link to; `None` for the first block.
    pub fn predecessor(&self) -> Option<Self> {
        self.0.checked_sub(1).filter(|&n| n > 0).map(Self)
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully built block that has not been assigned a store id yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsealedBlock {
    pub block_number: BlockNumber,
    pub previous_hash: PreviousHash,
    pub current_hash: VoteHash,
    pub voter_id: VoterId,
    pub candidate_id: CandidateId,
    pub election_id: ElectionId,
    pub position: Position,
    pub timestamp: Timestamp,
    pub nonce: u32,
    pub verification_code: VerificationCode,
}

impl UnsealedBlock {
    /// Attach the id the store assigned on insertion.
    pub fn seal(self, id: BlockId) -> VoteBlock {
        VoteBlock {
            id,
            block_number: self.block_number,
            previous_hash: self.previous_hash,
            current_hash: self.current_hash,
            voter_id: self.voter_id,
            candidate_id: self.candidate_id,
            election_id: self.election_id,
            position: self.position,
            timestamp: self.timestamp,
            nonce: self.nonce,
            verification_code: self.verification_code,
        }
    }
}

/// A persisted vote block.
///
/// Field order follows the logical row layout
/// `{ id, blockNumber, previousHash, currentHash, voterId, candidateId,
/// electionId, position, timestamp, nonce, verificationCode }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteBlock {
    pub id: BlockId,
    pub block_number: BlockNumber,
    pub previous_hash: PreviousHash,
    pub current_hash: VoteHash,
    pub voter_id: VoterId,
    pub candidate_id: CandidateId,
    pub election_id: ElectionId,
    pub position: Position,
    pub timestamp: Timestamp,
    pub nonce: u32,
    pub verification_code: VerificationCode,
}

impl VoteBlock {
    /// Whether this block claims to open its election's chain.
    pub fn is_genesis(&self) -> bool {
        self.previous_hash.is_genesis()
    }
}
