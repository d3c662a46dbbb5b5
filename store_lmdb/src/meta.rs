//! LMDB implementation of MetaStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use ballotchain_store::{MetaStore, StoreError, RESERVED_META_PREFIX};

use crate::LmdbError;

pub(crate) const SCHEMA_VERSION_KEY: &str = "ballotchain:schema_version";

/// Key-value bookkeeping that lives beside the ledger databases.
pub struct LmdbMetaStore {
    pub(crate) env: Arc<Env>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbMetaStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        Ok(self.meta_db.get(&rtxn, key.as_bytes())?.map(<[u8]>::to_vec))
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<(), LmdbError> {
        let mut wtxn = self.env.write_txn()?;
        self.meta_db.put(&mut wtxn, key.as_bytes(), value)?;
        wtxn.commit()?;
        Ok(())
    }
}

impl MetaStore for LmdbMetaStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        if key.starts_with(RESERVED_META_PREFIX) {
            return Err(StoreError::ReservedKey(key.to_string()));
        }
        Ok(self.write(key, value)?)
    }

    fn get_meta(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.read(key)?
            .ok_or_else(|| StoreError::NotFound(format!("meta key '{key}'")))
    }

    fn get_schema_version(&self) -> Result<u32, StoreError> {
        let Some(bytes) = self.read(SCHEMA_VERSION_KEY)? else {
            return Ok(0);
        };
        let arr: [u8; 4] = bytes.as_slice().try_into().map_err(|_| {
            StoreError::Corruption(format!("schema version is {} bytes", bytes.len()))
        })?;
        Ok(u32::from_le_bytes(arr))
    }

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError> {
        Ok(self.write(SCHEMA_VERSION_KEY, &version.to_le_bytes())?)
    }
}
