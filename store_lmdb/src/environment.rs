//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::audit_log::LmdbAuditLogStore;
use crate::integrity::{check_integrity, IntegrityReport};
use crate::meta::LmdbMetaStore;
use crate::migration::Migrator;
use crate::registry::LmdbVoterRegistryStore;
use crate::vote_chain::LmdbVoteChainStore;
use crate::write_batch::WriteBatch;
use crate::LmdbError;

/// Default LMDB map size: 1 GiB.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Number of named databases the environment creates.
pub const DEFAULT_MAX_DBS: u32 = 8;

/// Wraps the LMDB environment and all database handles.
///
/// Every handle is cheap to copy; the per-concern stores returned by the
/// accessor methods share the same environment.
#[derive(Clone)]
pub struct LmdbEnvironment {
    env: Arc<Env>,
    /// `(election, block_number)` -> bincode `VoteBlock`.
    pub(crate) blocks_db: Database<Bytes, Bytes>,
    /// `(voter, election, position)` -> block key.
    pub(crate) voter_positions_db: Database<Bytes, Bytes>,
    /// verification code -> block key.
    pub(crate) codes_db: Database<Bytes, Bytes>,
    /// `(voter, election)` -> bincode `VoterRegistryEntry`.
    pub(crate) registry_db: Database<Bytes, Bytes>,
    /// `(election, id)` -> bincode `AuditLogEntry`.
    pub(crate) audit_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path and bring its
    /// schema up to date.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per path by this process and
        // the memory map is only accessed through heed's transactions.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let blocks_db = env.create_database(&mut wtxn, Some("blocks"))?;
        let voter_positions_db = env.create_database(&mut wtxn, Some("voter_positions"))?;
        let codes_db = env.create_database(&mut wtxn, Some("verification_codes"))?;
        let registry_db = env.create_database(&mut wtxn, Some("voter_registry"))?;
        let audit_db = env.create_database(&mut wtxn, Some("audit_log"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        let environment = Self {
            env: Arc::new(env),
            blocks_db,
            voter_positions_db,
            codes_db,
            registry_db,
            audit_db,
            meta_db,
        };

        Migrator::run(&environment.meta_store())?;
        tracing::info!(path = %path.display(), "opened LMDB environment");
        Ok(environment)
    }

    /// Open with [`DEFAULT_MAX_DBS`] and [`DEFAULT_MAP_SIZE`].
    pub fn open_default(path: &Path) -> Result<Self, LmdbError> {
        Self::open(path, DEFAULT_MAX_DBS, DEFAULT_MAP_SIZE)
    }

    pub(crate) fn env(&self) -> &Env {
        &self.env
    }

    /// Begin a write batch; nothing is visible until it is committed.
    pub(crate) fn write_batch(&self) -> Result<WriteBatch<'_>, LmdbError> {
        WriteBatch::new(self)
    }

    pub fn vote_chain_store(&self) -> LmdbVoteChainStore {
        LmdbVoteChainStore { env: self.clone() }
    }

    pub fn voter_registry_store(&self) -> LmdbVoterRegistryStore {
        LmdbVoterRegistryStore {
            env: Arc::clone(&self.env),
            registry_db: self.registry_db,
        }
    }

    pub fn audit_log_store(&self) -> LmdbAuditLogStore {
        LmdbAuditLogStore { env: self.clone() }
    }

    pub fn meta_store(&self) -> LmdbMetaStore {
        LmdbMetaStore {
            env: Arc::clone(&self.env),
            meta_db: self.meta_db,
        }
    }

    /// Count entries in every database and cross-check the block indexes.
    pub fn check_integrity(&self) -> Result<IntegrityReport, LmdbError> {
        check_integrity(self)
    }
}
