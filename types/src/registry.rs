//! Side tables maintained next to the chain: the voter registry and the
//! election audit log. Neither is authoritative; the block set is.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{BlockNumber, ElectionId, Position, Timestamp, VoteHash, VoterId};

/// Denormalised "has this voter voted" flag for one election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterRegistryEntry {
    pub voter_id: VoterId,
    pub election_id: ElectionId,
    pub has_voted: bool,
    pub voted_at: Option<Timestamp>,
}

impl VoterRegistryEntry {
    /// Entry recording a vote cast at `at`.
    pub fn voted(voter_id: VoterId, election_id: ElectionId, at: Timestamp) -> Self {
        Self {
            voter_id,
            election_id,
            has_voted: true,
            voted_at: Some(at),
        }
    }
}

/// What an audit log entry records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// A block was appended to the chain.
    VoteCast,
    /// The chain was checked end to end.
    ChainAudited,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::VoteCast => "VOTE_CAST",
            AuditAction::ChainAudited => "CHAIN_AUDITED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an election's public audit trail.
///
/// Entries never name the voter or the candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Store-assigned; zero until appended.
    pub id: u64,
    pub election_id: ElectionId,
    pub action: AuditAction,
    pub block_hash: Option<VoteHash>,
    pub block_number: Option<BlockNumber>,
    pub position: Option<Position>,
    pub timestamp: Timestamp,
    pub details: BTreeMap<String, String>,
}

impl AuditLogEntry {
    pub fn new(election_id: ElectionId, action: AuditAction, timestamp: Timestamp) -> Self {
        Self {
            id: 0,
            election_id,
            action,
            block_hash: None,
            block_number: None,
            position: None,
            timestamp,
            details: BTreeMap::new(),
        }
    }

    pub fn with_block(mut self, hash: VoteHash, number: BlockNumber) -> Self {
        self.block_hash = Some(hash);
        self.block_number = Some(number);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.details.insert(key.into(), value.to_string());
        self
    }
}
