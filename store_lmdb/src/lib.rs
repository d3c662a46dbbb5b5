//! LMDB storage backend for the ballotchain vote ledger.
//!
//! Implements all storage traits from `ballotchain-store` using the `heed` LMDB
//! bindings. Each logical store maps to one or more LMDB databases within a
//! single environment, and [`LmdbEnvironment`] itself implements every trait
//! so it can back a ledger directly.

pub mod audit_log;
pub mod environment;
pub mod error;
pub mod integrity;
mod keys;
pub mod meta;
pub mod migration;
pub mod registry;
pub mod vote_chain;
pub mod write_batch;

pub use environment::{LmdbEnvironment, DEFAULT_MAP_SIZE, DEFAULT_MAX_DBS};
pub use error::LmdbError;
pub use integrity::IntegrityReport;

use ballotchain_store::{AuditLogStore, StoreError, VoteChainStore, VoterRegistryStore};
use ballotchain_types::{
    AuditLogEntry, BlockNumber, ElectionId, PreviousHash, UnsealedBlock, VerificationCode,
    VoteBlock, VoterId, VoterRegistryEntry,
};

impl VoteChainStore for LmdbEnvironment {
    fn tip_hash(&self, election: &ElectionId) -> Result<PreviousHash, StoreError> {
        self.vote_chain_store().tip_hash(election)
    }

    fn next_block_number(&self, election: &ElectionId) -> Result<BlockNumber, StoreError> {
        self.vote_chain_store().next_block_number(election)
    }

    fn chain_tip(&self, election: &ElectionId) -> Result<(PreviousHash, BlockNumber), StoreError> {
        self.vote_chain_store().chain_tip(election)
    }

    fn insert_block(&self, block: UnsealedBlock) -> Result<VoteBlock, StoreError> {
        self.vote_chain_store().insert_block(block)
    }

    fn find_by_verification_code(
        &self,
        code: &VerificationCode,
    ) -> Result<Option<VoteBlock>, StoreError> {
        self.vote_chain_store().find_by_verification_code(code)
    }

    fn blocks_for_election(&self, election: &ElectionId) -> Result<Vec<VoteBlock>, StoreError> {
        self.vote_chain_store().blocks_for_election(election)
    }

    fn blocks_for_voter(
        &self,
        voter: &VoterId,
        election: &ElectionId,
    ) -> Result<Vec<VoteBlock>, StoreError> {
        self.vote_chain_store().blocks_for_voter(voter, election)
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        self.vote_chain_store().block_count()
    }
}

impl VoterRegistryStore for LmdbEnvironment {
    fn upsert_voter_registry(&self, entry: &VoterRegistryEntry) -> Result<(), StoreError> {
        self.voter_registry_store().upsert_voter_registry(entry)
    }

    fn voter_registry(
        &self,
        voter: &VoterId,
        election: &ElectionId,
    ) -> Result<Option<VoterRegistryEntry>, StoreError> {
        self.voter_registry_store().voter_registry(voter, election)
    }
}

impl AuditLogStore for LmdbEnvironment {
    fn append_audit_entry(&self, entry: &AuditLogEntry) -> Result<u64, StoreError> {
        self.audit_log_store().append_audit_entry(entry)
    }

    fn audit_log(&self, election: &ElectionId) -> Result<Vec<AuditLogEntry>, StoreError> {
        self.audit_log_store().audit_log(election)
    }
}
