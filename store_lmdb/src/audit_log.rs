//! LMDB implementation of AuditLogStore.

use ballotchain_store::{AuditLogStore, StoreError};
use ballotchain_types::{AuditLogEntry, ElectionId};

use crate::environment::LmdbEnvironment;
use crate::keys::election_prefix;
use crate::write_batch::NEXT_AUDIT_ID_KEY;
use crate::LmdbError;

pub struct LmdbAuditLogStore {
    pub(crate) env: LmdbEnvironment,
}

impl AuditLogStore for LmdbAuditLogStore {
    fn append_audit_entry(&self, entry: &AuditLogEntry) -> Result<u64, StoreError> {
        let mut batch = self.env.write_batch()?;
        let id = batch.next_counter(NEXT_AUDIT_ID_KEY)?;
        let mut stored = entry.clone();
        stored.id = id;
        batch.put_audit_entry(&stored)?;
        batch.commit()?;
        Ok(id)
    }

    fn audit_log(&self, election: &ElectionId) -> Result<Vec<AuditLogEntry>, StoreError> {
        let rtxn = self.env.env().read_txn().map_err(LmdbError::from)?;
        let prefix = election_prefix(election);
        let iter = self
            .env
            .audit_db
            .prefix_iter(&rtxn, prefix.as_slice())
            .map_err(LmdbError::from)?;
        let mut entries = Vec::new();
        for item in iter {
            let (_, bytes) = item.map_err(LmdbError::from)?;
            entries.push(bincode::deserialize(bytes).map_err(LmdbError::from)?);
        }
        Ok(entries)
    }
}
