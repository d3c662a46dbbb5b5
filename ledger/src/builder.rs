//! Block Builder: turns a ballot choice into a fully hashed block ready for
//! insertion.

use ballotchain_crypto::{new_nonce, new_verification_code, vote_digest, HashInput, RandomSource};
use ballotchain_store::VoteChainStore;
use ballotchain_types::{
    CandidateId, Clock, ElectionId, Position, Timestamp, UnsealedBlock, VoteHash, VoterId,
};

use crate::LedgerError;

/// Builds blocks on top of an election's current tip.
///
/// The tip hash and next block number come from one store snapshot. A
/// concurrent cast may still extend the chain before the built block is
/// inserted; the store then rejects it with a block-number conflict.
pub struct BlockBuilder<'a, S, C, R> {
    store: &'a S,
    clock: &'a C,
    random: &'a R,
}

impl<'a, S, C, R> BlockBuilder<'a, S, C, R>
where
    S: VoteChainStore,
    C: Clock,
    R: RandomSource,
{
    pub fn new(store: &'a S, clock: &'a C, random: &'a R) -> Self {
        Self {
            store,
            clock,
            random,
        }
    }

    /// Build the next block of `election`, stamped with the clock's current
    /// time.
    pub fn build(
        &self,
        election: &ElectionId,
        voter: &VoterId,
        candidate: &CandidateId,
        position: &Position,
    ) -> Result<UnsealedBlock, LedgerError> {
        self.build_at(election, voter, candidate, position, self.clock.now())
    }

    /// Build the next block of `election` stamped with `timestamp`.
    ///
    /// The nonce is drawn before the verification code. Uniqueness is left
    /// to the store.
    pub fn build_at(
        &self,
        election: &ElectionId,
        voter: &VoterId,
        candidate: &CandidateId,
        position: &Position,
        timestamp: Timestamp,
    ) -> Result<UnsealedBlock, LedgerError> {
        let (previous_hash, block_number) = self
            .store
            .chain_tip(election)
            .map_err(LedgerError::ChainStateUnavailable)?;

        let nonce = new_nonce(self.random)?;
        let verification_code = new_verification_code(self.random)?;

        let mut block = UnsealedBlock {
            block_number,
            previous_hash,
            current_hash: VoteHash::new([0; 32]),
            voter_id: voter.clone(),
            candidate_id: candidate.clone(),
            election_id: election.clone(),
            position: position.clone(),
            timestamp,
            nonce,
            verification_code,
        };
        block.current_hash = vote_digest(&HashInput::from_unsealed(&block));

        tracing::debug!(
            election = %election,
            block_number = %block.block_number,
            previous = %block.previous_hash.short(8),
            hash = %block.current_hash.short(8),
            "built vote block"
        );
        Ok(block)
    }
}
