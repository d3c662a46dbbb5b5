//! Bookkeeping values stored beside the ledger.

use crate::StoreError;

/// Prefix of the meta keys a backend keeps for itself: id counters and the
/// schema version. [`MetaStore::put_meta`] refuses them.
pub const RESERVED_META_PREFIX: &str = "ballotchain:";

/// Raw key-value access plus the schema version stamp.
pub trait MetaStore {
    /// Fails with [`StoreError::ReservedKey`] for keys under
    /// [`RESERVED_META_PREFIX`].
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Fails with [`StoreError::NotFound`] for an absent key.
    fn get_meta(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// `0` until the environment has been stamped.
    fn get_schema_version(&self) -> Result<u32, StoreError>;

    fn set_schema_version(&self, version: u32) -> Result<(), StoreError>;
}
