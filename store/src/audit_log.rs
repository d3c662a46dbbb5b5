//! Audit log storage trait.

use crate::StoreError;
use ballotchain_types::{AuditLogEntry, ElectionId};

/// Append-only audit trail per election.
pub trait AuditLogStore {
    /// Append an entry, returning the id the store assigned.
    fn append_audit_entry(&self, entry: &AuditLogEntry) -> Result<u64, StoreError>;

    /// All entries of an election in append order.
    fn audit_log(&self, election: &ElectionId) -> Result<Vec<AuditLogEntry>, StoreError>;
}
