//! Schema versioning for the LMDB environment.
//!
//! The version lives in the meta database. Opening an environment stamps a
//! fresh one with [`CURRENT_SCHEMA_VERSION`], steps an older one forward one
//! version at a time, and refuses one written by a newer build.

use ballotchain_store::MetaStore;

use crate::LmdbError;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

pub struct Migrator;

impl Migrator {
    pub fn run(meta: &impl MetaStore) -> Result<(), LmdbError> {
        let schema_err = |e: ballotchain_store::StoreError| LmdbError::Schema(e.to_string());
        let stored = meta.get_schema_version().map_err(schema_err)?;

        match stored.cmp(&CURRENT_SCHEMA_VERSION) {
            std::cmp::Ordering::Equal => {
                tracing::debug!(version = stored, "schema current");
                Ok(())
            }
            std::cmp::Ordering::Greater => Err(LmdbError::Schema(format!(
                "stored schema {stored} is newer than this build ({CURRENT_SCHEMA_VERSION})"
            ))),
            std::cmp::Ordering::Less => {
                for from in stored..CURRENT_SCHEMA_VERSION {
                    run_migration(from, from + 1)?;
                    tracing::info!(from, to = from + 1, "schema migrated");
                }
                meta.set_schema_version(CURRENT_SCHEMA_VERSION)
                    .map_err(schema_err)?;
                Ok(())
            }
        }
    }
}

fn run_migration(from: u32, to: u32) -> Result<(), LmdbError> {
    match (from, to) {
        // 0 is an empty environment; version 1 adds no data transformation.
        (0, 1) => Ok(()),
        _ => Err(LmdbError::Schema(format!("no migration from {from} to {to}"))),
    }
}
