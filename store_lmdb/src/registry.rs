//! LMDB implementation of VoterRegistryStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use ballotchain_store::{StoreError, VoterRegistryStore};
use ballotchain_types::{ElectionId, VoterId, VoterRegistryEntry};

use crate::keys::voter_prefix;
use crate::LmdbError;

pub struct LmdbVoterRegistryStore {
    pub(crate) env: Arc<Env>,
    pub(crate) registry_db: Database<Bytes, Bytes>,
}

impl VoterRegistryStore for LmdbVoterRegistryStore {
    fn upsert_voter_registry(&self, entry: &VoterRegistryEntry) -> Result<(), StoreError> {
        let key = voter_prefix(&entry.voter_id, &entry.election_id);
        let bytes = bincode::serialize(entry).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.registry_db
            .put(&mut wtxn, key.as_slice(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn voter_registry(
        &self,
        voter: &VoterId,
        election: &ElectionId,
    ) -> Result<Option<VoterRegistryEntry>, StoreError> {
        let key = voter_prefix(voter, election);
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .registry_db
            .get(&rtxn, key.as_slice())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }
}
