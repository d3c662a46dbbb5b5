//! LMDB implementation of VoteChainStore.

use ballotchain_store::{StoreError, VoteChainStore};
use ballotchain_types::{
    BlockId, BlockNumber, ElectionId, PreviousHash, UnsealedBlock, VerificationCode, VoteBlock,
    VoterId,
};

use crate::environment::LmdbEnvironment;
use crate::keys::{block_number_of, election_prefix, voter_prefix};
use crate::write_batch::NEXT_BLOCK_ID_KEY;
use crate::LmdbError;

pub struct LmdbVoteChainStore {
    pub(crate) env: LmdbEnvironment,
}

impl LmdbVoteChainStore {
    fn decode(bytes: &[u8]) -> Result<VoteBlock, LmdbError> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// The highest-numbered block of an election, if any.
    fn last_block(&self, election: &ElectionId) -> Result<Option<VoteBlock>, LmdbError> {
        let rtxn = self.env.env().read_txn()?;
        let prefix = election_prefix(election);
        let mut iter = self.env.blocks_db.rev_prefix_iter(&rtxn, prefix.as_slice())?;
        match iter.next() {
            Some(entry) => {
                let (_, bytes) = entry?;
                Ok(Some(Self::decode(bytes)?))
            }
            None => Ok(None),
        }
    }
}

impl VoteChainStore for LmdbVoteChainStore {
    fn tip_hash(&self, election: &ElectionId) -> Result<PreviousHash, StoreError> {
        let tip = self.last_block(election)?;
        Ok(tip.map_or(PreviousHash::Genesis, |b| PreviousHash::Block(b.current_hash)))
    }

    fn next_block_number(&self, election: &ElectionId) -> Result<BlockNumber, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let prefix = election_prefix(election);
        let mut iter = self
            .env
            .blocks_db
            .rev_prefix_iter(&rtxn, prefix.as_slice())
            .map_err(LmdbError::from)?;
        match iter.next() {
            Some(entry) => {
                let (key, _) = entry.map_err(LmdbError::from)?;
                let last = block_number_of(key)
                    .ok_or_else(|| StoreError::Corruption("malformed block key".into()))?;
                Ok(last.next())
            }
            None => Ok(BlockNumber::FIRST),
        }
    }

    fn chain_tip(&self, election: &ElectionId) -> Result<(PreviousHash, BlockNumber), StoreError> {
        Ok(match self.last_block(election)? {
            Some(tip) => (PreviousHash::Block(tip.current_hash), tip.block_number.next()),
            None => (PreviousHash::Genesis, BlockNumber::FIRST),
        })
    }

    fn insert_block(&self, block: UnsealedBlock) -> Result<VoteBlock, StoreError> {
        let mut batch = self.env.write_batch()?;

        if batch.voter_position_taken(&block.voter_id, &block.election_id, &block.position)? {
            return Err(StoreError::DuplicateVoterPosition {
                voter: block.voter_id,
                election: block.election_id,
                position: block.position,
            });
        }
        if batch.block_exists(&block.election_id, block.block_number)? {
            return Err(StoreError::BlockNumberConflict {
                election: block.election_id,
                block_number: block.block_number,
            });
        }
        if batch.expected_link(&block.election_id, block.block_number)?
            != Some(block.previous_hash)
        {
            tracing::debug!(
                election = %block.election_id,
                block_number = %block.block_number,
                "block does not link to its predecessor"
            );
            return Err(StoreError::BlockNumberConflict {
                election: block.election_id,
                block_number: block.block_number,
            });
        }
        if batch.code_taken(&block.verification_code)? {
            return Err(StoreError::DuplicateVerificationCode);
        }

        let id = BlockId::new(batch.next_counter(NEXT_BLOCK_ID_KEY)?);
        let sealed = block.seal(id);
        batch.put_block(&sealed)?;
        batch.commit()?;

        tracing::debug!(
            election = %sealed.election_id,
            block_number = %sealed.block_number,
            id = %sealed.id,
            "block committed"
        );
        Ok(sealed)
    }

    fn find_by_verification_code(
        &self,
        code: &VerificationCode,
    ) -> Result<Option<VoteBlock>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let Some(block_key) = self
            .env
            .codes_db
            .get(&rtxn, code.as_str().as_bytes())
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        let bytes = self
            .env
            .blocks_db
            .get(&rtxn, block_key)
            .map_err(LmdbError::from)?
            .ok_or_else(|| StoreError::Corruption(format!("code {code} points at a missing block")))?;
        Ok(Some(Self::decode(bytes)?))
    }

    fn blocks_for_election(&self, election: &ElectionId) -> Result<Vec<VoteBlock>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let prefix = election_prefix(election);
        let iter = self
            .env
            .blocks_db
            .prefix_iter(&rtxn, prefix.as_slice())
            .map_err(LmdbError::from)?;
        let mut blocks = Vec::new();
        for entry in iter {
            let (_, bytes) = entry.map_err(LmdbError::from)?;
            blocks.push(Self::decode(bytes)?);
        }
        Ok(blocks)
    }

    fn blocks_for_voter(
        &self,
        voter: &VoterId,
        election: &ElectionId,
    ) -> Result<Vec<VoteBlock>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let prefix = voter_prefix(voter, election);
        let iter = self
            .env
            .voter_positions_db
            .prefix_iter(&rtxn, prefix.as_slice())
            .map_err(LmdbError::from)?;
        let mut blocks = Vec::new();
        for entry in iter {
            let (_, block_key) = entry.map_err(LmdbError::from)?;
            let bytes = self
                .env
                .blocks_db
                .get(&rtxn, block_key)
                .map_err(LmdbError::from)?
                .ok_or_else(|| StoreError::Corruption("voter index points at a missing block".into()))?;
            blocks.push(Self::decode(bytes)?);
        }
        Ok(blocks)
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        Ok(self.env.blocks_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}
