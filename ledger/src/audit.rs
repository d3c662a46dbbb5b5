//! Chain Integrity Auditor.
//!
//! A single pass over one election's blocks, sorted by block number. Each
//! block must link to its predecessor and hash to its stored `currentHash`.
//! The first failure ends the audit; nothing is repaired.

use std::fmt;

use ballotchain_crypto::recompute_hash;
use ballotchain_types::{BlockNumber, VoteBlock};
use serde::{Deserialize, Serialize};

/// How the lowest-numbered block is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditMode {
    /// The chain must start at block 1 with a `GENESIS` previous hash.
    #[default]
    #[serde(rename = "full")]
    FullChain,
    /// The blocks are a window of a longer chain; the first block's link
    /// is not checked.
    #[serde(rename = "window")]
    Window,
}

impl AuditMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditMode::FullChain => "full",
            AuditMode::Window => "window",
        }
    }
}

impl fmt::Display for AuditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What was wrong with the first invalid block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    /// Full-chain audit whose first block is not a genesis block 1.
    MissingGenesis,
    /// `previousHash` differs from the preceding block's `currentHash`.
    BrokenLink,
    /// Recomputing the hash does not reproduce the stored `currentHash`.
    HashMismatch,
}

impl BreakKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakKind::MissingGenesis => "missing_genesis",
            BreakKind::BrokenLink => "broken_link",
            BreakKind::HashMismatch => "hash_mismatch",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainBreak {
    pub block_number: BlockNumber,
    pub kind: BreakKind,
}

/// Result of auditing a set of blocks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainAudit {
    pub mode: AuditMode,
    /// Blocks examined, including the invalid one if any.
    pub blocks_checked: usize,
    pub first_break: Option<ChainBreak>,
}

impl ChainAudit {
    pub fn valid(&self) -> bool {
        self.first_break.is_none()
    }

    pub fn first_invalid_block_number(&self) -> Option<BlockNumber> {
        self.first_break.map(|b| b.block_number)
    }
}

/// Audit an unordered set of blocks belonging to one election.
///
/// An empty set is a valid chain.
pub fn audit_chain(blocks: &[VoteBlock], mode: AuditMode) -> ChainAudit {
    let mut ordered: Vec<&VoteBlock> = blocks.iter().collect();
    ordered.sort_by_key(|b| b.block_number);

    let mut checked = 0;
    let mut previous: Option<&VoteBlock> = None;
    for block in ordered {
        checked += 1;
        let kind = match previous {
            None if mode == AuditMode::FullChain
                && !(block.is_genesis() && block.block_number == BlockNumber::FIRST) =>
            {
                Some(BreakKind::MissingGenesis)
            }
            Some(prev) if !block.previous_hash.links_to(&prev.current_hash) => {
                Some(BreakKind::BrokenLink)
            }
            _ if recompute_hash(block) != block.current_hash => Some(BreakKind::HashMismatch),
            _ => None,
        };
        if let Some(kind) = kind {
            return ChainAudit {
                mode,
                blocks_checked: checked,
                first_break: Some(ChainBreak {
                    block_number: block.block_number,
                    kind,
                }),
            };
        }
        previous = Some(block);
    }

    ChainAudit {
        mode,
        blocks_checked: checked,
        first_break: None,
    }
}
