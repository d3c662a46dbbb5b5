//! Vote chain storage trait.

use crate::StoreError;
use ballotchain_types::{
    BlockNumber, ElectionId, PreviousHash, UnsealedBlock, VerificationCode, VoteBlock, VoterId,
};

/// Append-only storage for every election's chain of vote blocks.
///
/// Implementations must make [`VoteChainStore::insert_block`] atomic: the
/// uniqueness checks on `(election, block_number)`, `(voter, election,
/// position)` and the verification code happen in the same step as the write,
/// never as a separate read.
pub trait VoteChainStore {
    /// Hash of the highest-numbered block in the election, or
    /// [`PreviousHash::Genesis`] if the chain is empty.
    fn tip_hash(&self, election: &ElectionId) -> Result<PreviousHash, StoreError>;

    /// The number the next block in this election should carry.
    fn next_block_number(&self, election: &ElectionId) -> Result<BlockNumber, StoreError>;

    /// Tip hash and next block number read from one snapshot, so the pair
    /// always describes the same chain state.
    fn chain_tip(&self, election: &ElectionId) -> Result<(PreviousHash, BlockNumber), StoreError>;

    /// Insert a block, assigning it an id.
    ///
    /// The block must link to its predecessor: `previous_hash` is the stored
    /// hash of block `block_number - 1`, or genesis for the first block. A
    /// block that does not link is rejected with
    /// [`StoreError::BlockNumberConflict`], as is a taken block number.
    ///
    /// Fails with [`StoreError::DuplicateVoterPosition`],
    /// [`StoreError::BlockNumberConflict`] or
    /// [`StoreError::DuplicateVerificationCode`] without writing anything.
    fn insert_block(&self, block: UnsealedBlock) -> Result<VoteBlock, StoreError>;

    /// Look up a block by the voter's verification code.
    fn find_by_verification_code(
        &self,
        code: &VerificationCode,
    ) -> Result<Option<VoteBlock>, StoreError>;

    /// All blocks of an election. Order is unspecified.
    fn blocks_for_election(&self, election: &ElectionId) -> Result<Vec<VoteBlock>, StoreError>;

    /// All blocks a voter cast in an election. Order is unspecified.
    fn blocks_for_voter(
        &self,
        voter: &VoterId,
        election: &ElectionId,
    ) -> Result<Vec<VoteBlock>, StoreError>;

    /// Total number of blocks across all elections.
    fn block_count(&self) -> Result<u64, StoreError>;
}
