//! Composite key encoding.
//!
//! Every string component is written as a big-endian `u32` length followed by
//! its bytes, so no component can be a prefix of another and prefix scans over
//! leading components are exact. Integers are big-endian so LMDB's
//! lexicographic order matches numeric order.

use ballotchain_types::{BlockNumber, ElectionId, Position, VoterId};

fn push_component(key: &mut Vec<u8>, component: &str) {
    let bytes = component.as_bytes();
    let len = u32::try_from(bytes.len()).expect("identifier shorter than 4 GiB");
    key.extend_from_slice(&len.to_be_bytes());
    key.extend_from_slice(bytes);
}

/// Prefix shared by every block of one election.
pub(crate) fn election_prefix(election: &ElectionId) -> Vec<u8> {
    let mut key = Vec::with_capacity(4 + election.as_str().len() + 8);
    push_component(&mut key, election.as_str());
    key
}

/// `(election, block_number)` -> block.
pub(crate) fn block_key(election: &ElectionId, number: BlockNumber) -> Vec<u8> {
    let mut key = election_prefix(election);
    key.extend_from_slice(&number.get().to_be_bytes());
    key
}

/// Recover the block number from the tail of a [`block_key`].
pub(crate) fn block_number_of(key: &[u8]) -> Option<BlockNumber> {
    let tail: [u8; 8] = key.get(key.len().checked_sub(8)?..)?.try_into().ok()?;
    Some(BlockNumber::new(u64::from_be_bytes(tail)))
}

/// Prefix of every position a voter holds in an election.
pub(crate) fn voter_prefix(voter: &VoterId, election: &ElectionId) -> Vec<u8> {
    let mut key = Vec::new();
    push_component(&mut key, voter.as_str());
    push_component(&mut key, election.as_str());
    key
}

/// `(voter, election, position)` uniqueness key.
pub(crate) fn voter_position_key(
    voter: &VoterId,
    election: &ElectionId,
    position: &Position,
) -> Vec<u8> {
    let mut key = voter_prefix(voter, election);
    push_component(&mut key, position.as_str());
    key
}

/// `(election, sequence)` -> audit entry.
pub(crate) fn audit_key(election: &ElectionId, id: u64) -> Vec<u8> {
    let mut key = election_prefix(election);
    key.extend_from_slice(&id.to_be_bytes());
    key
}
