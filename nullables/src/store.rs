//! Nullable store: thread-safe in-memory storage for testing.

use ballotchain_store::{AuditLogStore, StoreError, VoteChainStore, VoterRegistryStore};
use ballotchain_types::{
    AuditLogEntry, BlockId, BlockNumber, ElectionId, Position, PreviousHash, UnsealedBlock,
    VerificationCode, VoteBlock, VoterId, VoterRegistryEntry,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

/// Operations that can be made to fail on demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailPoint {
    TipHash,
    NextBlockNumber,
    InsertBlock,
    Lookup,
    VoterRegistry,
    AuditLog,
}

type BlockKey = (ElectionId, BlockNumber);

#[derive(Default)]
struct Inner {
    blocks: BTreeMap<BlockKey, VoteBlock>,
    voter_positions: HashMap<(VoterId, ElectionId, Position), BlockKey>,
    codes: HashMap<VerificationCode, BlockKey>,
    registry: HashMap<(VoterId, ElectionId), VoterRegistryEntry>,
    audit: Vec<AuditLogEntry>,
    next_block_id: u64,
    failures: HashSet<FailPoint>,
    interleaved: Vec<UnsealedBlock>,
}

impl Inner {
    fn check(&self, point: FailPoint) -> Result<(), StoreError> {
        if self.failures.contains(&point) {
            Err(StoreError::Backend(format!("injected failure at {point:?}")))
        } else {
            Ok(())
        }
    }

    fn election_range(
        &self,
        election: &ElectionId,
    ) -> std::collections::btree_map::Range<'_, BlockKey, VoteBlock> {
        self.blocks.range(
            (election.clone(), BlockNumber::new(0))..=(election.clone(), BlockNumber::new(u64::MAX)),
        )
    }

    fn expected_link(&self, election: &ElectionId, number: BlockNumber) -> Option<PreviousHash> {
        if number == BlockNumber::FIRST {
            return Some(PreviousHash::Genesis);
        }
        let predecessor = number.predecessor()?;
        self.blocks
            .get(&(election.clone(), predecessor))
            .map(|b| PreviousHash::Block(b.current_hash))
    }

    fn insert(&mut self, block: UnsealedBlock) -> Result<VoteBlock, StoreError> {
        let voter_key = (
            block.voter_id.clone(),
            block.election_id.clone(),
            block.position.clone(),
        );
        if self.voter_positions.contains_key(&voter_key) {
            return Err(StoreError::DuplicateVoterPosition {
                voter: block.voter_id,
                election: block.election_id,
                position: block.position,
            });
        }
        let key = (block.election_id.clone(), block.block_number);
        if self.blocks.contains_key(&key) {
            return Err(StoreError::BlockNumberConflict {
                election: block.election_id,
                block_number: block.block_number,
            });
        }
        if self.expected_link(&block.election_id, block.block_number) != Some(block.previous_hash) {
            return Err(StoreError::BlockNumberConflict {
                election: block.election_id,
                block_number: block.block_number,
            });
        }
        if self.codes.contains_key(&block.verification_code) {
            return Err(StoreError::DuplicateVerificationCode);
        }

        self.next_block_id += 1;
        let sealed = block.seal(BlockId::new(self.next_block_id));
        self.voter_positions.insert(voter_key, key.clone());
        self.codes.insert(sealed.verification_code.clone(), key.clone());
        self.blocks.insert(key, sealed.clone());
        Ok(sealed)
    }
}

/// An in-memory implementation of every ledger store trait.
///
/// All state sits behind one mutex, so each trait method is atomic, matching
/// the guarantees a transactional backend gives.
#[derive(Default)]
pub struct NullStore {
    inner: Mutex<Inner>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call through `point` fail with a backend error.
    pub fn fail_at(&self, point: FailPoint) {
        self.inner.lock().unwrap().failures.insert(point);
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) {
        self.inner.lock().unwrap().failures.clear();
    }

    /// Insert `block` immediately before the next `insert_block` call,
    /// simulating a concurrent writer that wins the race.
    pub fn interleave_before_next_insert(&self, block: UnsealedBlock) {
        self.inner.lock().unwrap().interleaved.push(block);
    }

    /// Mutate a stored block in place, bypassing every invariant.
    ///
    /// Stands in for out-of-band tampering so tests can check detection.
    /// Returns `false` if no block carries `code`.
    pub fn tamper(&self, code: &VerificationCode, mutate: impl FnOnce(&mut VoteBlock)) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let Some(key) = inner.codes.get(code).cloned() else {
            return false;
        };
        match inner.blocks.get_mut(&key) {
            Some(block) => {
                mutate(block);
                true
            }
            None => false,
        }
    }

    /// Every stored block, ordered by election then block number.
    pub fn all_blocks(&self) -> Vec<VoteBlock> {
        self.inner.lock().unwrap().blocks.values().cloned().collect()
    }
}

impl VoteChainStore for NullStore {
    fn tip_hash(&self, election: &ElectionId) -> Result<PreviousHash, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.check(FailPoint::TipHash)?;
        Ok(inner
            .election_range(election)
            .next_back()
            .map_or(PreviousHash::Genesis, |(_, b)| PreviousHash::Block(b.current_hash)))
    }

    fn next_block_number(&self, election: &ElectionId) -> Result<BlockNumber, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.check(FailPoint::NextBlockNumber)?;
        Ok(inner
            .election_range(election)
            .next_back()
            .map_or(BlockNumber::FIRST, |((_, n), _)| n.next()))
    }

    fn chain_tip(&self, election: &ElectionId) -> Result<(PreviousHash, BlockNumber), StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.check(FailPoint::TipHash)?;
        inner.check(FailPoint::NextBlockNumber)?;
        Ok(inner.election_range(election).next_back().map_or(
            (PreviousHash::Genesis, BlockNumber::FIRST),
            |((_, n), b)| (PreviousHash::Block(b.current_hash), n.next()),
        ))
    }

    fn insert_block(&self, block: UnsealedBlock) -> Result<VoteBlock, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check(FailPoint::InsertBlock)?;
        for foreign in std::mem::take(&mut inner.interleaved) {
            inner.insert(foreign)?;
        }
        inner.insert(block)
    }

    fn find_by_verification_code(
        &self,
        code: &VerificationCode,
    ) -> Result<Option<VoteBlock>, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.check(FailPoint::Lookup)?;
        Ok(inner
            .codes
            .get(code)
            .and_then(|key| inner.blocks.get(key))
            .cloned())
    }

    fn blocks_for_election(&self, election: &ElectionId) -> Result<Vec<VoteBlock>, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.check(FailPoint::Lookup)?;
        Ok(inner.election_range(election).map(|(_, b)| b.clone()).collect())
    }

    fn blocks_for_voter(
        &self,
        voter: &VoterId,
        election: &ElectionId,
    ) -> Result<Vec<VoteBlock>, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.check(FailPoint::Lookup)?;
        Ok(inner
            .election_range(election)
            .filter(|(_, b)| &b.voter_id == voter)
            .map(|(_, b)| b.clone())
            .collect())
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.lock().unwrap().blocks.len() as u64)
    }
}

impl VoterRegistryStore for NullStore {
    fn upsert_voter_registry(&self, entry: &VoterRegistryEntry) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check(FailPoint::VoterRegistry)?;
        inner.registry.insert(
            (entry.voter_id.clone(), entry.election_id.clone()),
            entry.clone(),
        );
        Ok(())
    }

    fn voter_registry(
        &self,
        voter: &VoterId,
        election: &ElectionId,
    ) -> Result<Option<VoterRegistryEntry>, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.check(FailPoint::VoterRegistry)?;
        Ok(inner
            .registry
            .get(&(voter.clone(), election.clone()))
            .cloned())
    }
}

impl AuditLogStore for NullStore {
    fn append_audit_entry(&self, entry: &AuditLogEntry) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check(FailPoint::AuditLog)?;
        let id = inner.audit.len() as u64 + 1;
        let mut stored = entry.clone();
        stored.id = id;
        inner.audit.push(stored);
        Ok(id)
    }

    fn audit_log(&self, election: &ElectionId) -> Result<Vec<AuditLogEntry>, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.check(FailPoint::AuditLog)?;
        Ok(inner
            .audit
            .iter()
            .filter(|e| &e.election_id == election)
            .cloned()
            .collect())
    }
}
