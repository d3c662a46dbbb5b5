//! Voter registry storage trait.

use crate::StoreError;
use ballotchain_types::{ElectionId, VoterId, VoterRegistryEntry};

/// Per-voter, per-election "has voted" flags.
///
/// Not authoritative for uniqueness; the vote chain is.
pub trait VoterRegistryStore {
    /// Insert or replace the entry for `(entry.voter_id, entry.election_id)`.
    fn upsert_voter_registry(&self, entry: &VoterRegistryEntry) -> Result<(), StoreError>;

    /// Get the entry for a voter in an election.
    fn voter_registry(
        &self,
        voter: &VoterId,
        election: &ElectionId,
    ) -> Result<Option<VoterRegistryEntry>, StoreError>;
}
