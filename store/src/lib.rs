//! Abstract storage traits for the ballotchain vote ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod audit_log;
pub mod error;
pub mod meta;
pub mod registry;
pub mod vote_chain;

pub use audit_log::AuditLogStore;
pub use error::StoreError;
pub use meta::{MetaStore, RESERVED_META_PREFIX};
pub use registry::VoterRegistryStore;
pub use vote_chain::VoteChainStore;

/// Everything the ledger needs from one backend.
pub trait LedgerStore: VoteChainStore + VoterRegistryStore + AuditLogStore {}

impl<T: VoteChainStore + VoterRegistryStore + AuditLogStore> LedgerStore for T {}
