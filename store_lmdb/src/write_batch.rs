//! Write batching: groups the writes of one logical insert into a single LMDB
//! write transaction.
//!
//! LMDB admits one write transaction at a time, so existence checks made
//! through a batch cannot be invalidated before the batch commits. If the
//! batch is dropped without calling [`WriteBatch::commit`], all operations are
//! rolled back.

use heed::RwTxn;

use ballotchain_types::{
    AuditLogEntry, BlockNumber, ElectionId, Position, PreviousHash, VerificationCode, VoteBlock,
    VoterId,
};

use crate::environment::LmdbEnvironment;
use crate::keys::{audit_key, block_key, voter_position_key};
use crate::LmdbError;

// Under `RESERVED_META_PREFIX`, out of reach of `MetaStore::put_meta`.
pub(crate) const NEXT_BLOCK_ID_KEY: &[u8] = b"ballotchain:next_block_id";
pub(crate) const NEXT_AUDIT_ID_KEY: &[u8] = b"ballotchain:next_audit_id";

pub struct WriteBatch<'a> {
    txn: RwTxn<'a>,
    env: &'a LmdbEnvironment,
}

impl<'a> WriteBatch<'a> {
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, LmdbError> {
        let txn = env.env().write_txn()?;
        Ok(Self { txn, env })
    }

    // ── Uniqueness probes ───────────────────────────────────────────────

    pub fn block_exists(&self, election: &ElectionId, number: BlockNumber) -> Result<bool, LmdbError> {
        let key = block_key(election, number);
        Ok(self.env.blocks_db.get(&self.txn, key.as_slice())?.is_some())
    }

    /// The `previous_hash` a block numbered `number` must carry, or `None`
    /// when its predecessor has not been written.
    pub fn expected_link(
        &self,
        election: &ElectionId,
        number: BlockNumber,
    ) -> Result<Option<PreviousHash>, LmdbError> {
        if number == BlockNumber::FIRST {
            return Ok(Some(PreviousHash::Genesis));
        }
        let Some(predecessor) = number.predecessor() else {
            return Ok(None);
        };
        let key = block_key(election, predecessor);
        match self.env.blocks_db.get(&self.txn, key.as_slice())? {
            Some(bytes) => {
                let block: VoteBlock = bincode::deserialize(bytes)?;
                Ok(Some(PreviousHash::Block(block.current_hash)))
            }
            None => Ok(None),
        }
    }

    pub fn voter_position_taken(
        &self,
        voter: &VoterId,
        election: &ElectionId,
        position: &Position,
    ) -> Result<bool, LmdbError> {
        let key = voter_position_key(voter, election, position);
        Ok(self.env.voter_positions_db.get(&self.txn, key.as_slice())?.is_some())
    }

    pub fn code_taken(&self, code: &VerificationCode) -> Result<bool, LmdbError> {
        Ok(self
            .env
            .codes_db
            .get(&self.txn, code.as_str().as_bytes())?
            .is_some())
    }

    // ── Counters ────────────────────────────────────────────────────────

    /// Take the next value of a monotonically increasing counter in the meta
    /// database. Counters start at 1.
    pub fn next_counter(&mut self, name: &[u8]) -> Result<u64, LmdbError> {
        let current = match self.env.meta_db.get(&self.txn, name)? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes.try_into().map_err(|_| {
                    LmdbError::Serialization(format!(
                        "counter {} has unexpected byte length",
                        String::from_utf8_lossy(name)
                    ))
                })?;
                u64::from_be_bytes(arr)
            }
            None => 1,
        };
        self.env
            .meta_db
            .put(&mut self.txn, name, &(current + 1).to_be_bytes())?;
        Ok(current)
    }

    // ── Writes ──────────────────────────────────────────────────────────

    /// Write a block together with its voter-position and code index entries.
    pub fn put_block(&mut self, block: &VoteBlock) -> Result<(), LmdbError> {
        let key = block_key(&block.election_id, block.block_number);
        let bytes = bincode::serialize(block)?;
        self.env.blocks_db.put(&mut self.txn, key.as_slice(), &bytes)?;

        let voter_key = voter_position_key(&block.voter_id, &block.election_id, &block.position);
        self.env
            .voter_positions_db
            .put(&mut self.txn, voter_key.as_slice(), key.as_slice())?;

        self.env.codes_db.put(
            &mut self.txn,
            block.verification_code.as_str().as_bytes(),
            key.as_slice(),
        )?;
        Ok(())
    }

    /// Append an audit entry under its already-assigned id.
    pub fn put_audit_entry(&mut self, entry: &AuditLogEntry) -> Result<(), LmdbError> {
        let key = audit_key(&entry.election_id, entry.id);
        let bytes = bincode::serialize(entry)?;
        self.env.audit_db.put(&mut self.txn, key.as_slice(), &bytes)?;
        Ok(())
    }

    /// Commit every operation in the batch atomically.
    pub fn commit(self) -> Result<(), LmdbError> {
        self.txn.commit()?;
        Ok(())
    }
}
