//! Hash-chained vote ledger.
//!
//! Each election is its own append-only chain: every block carries the hash
//! of the block before it, so altering any recorded vote breaks either its
//! own hash or the next block's link. A single authority writes the chain;
//! the store's atomic insert is the only coordination point.

pub mod audit;
pub mod builder;
pub mod casting;
pub mod error;
pub mod ledger;
pub mod schedule;
pub mod verification;

pub use audit::{audit_chain, AuditMode, BreakKind, ChainAudit, ChainBreak};
pub use builder::BlockBuilder;
pub use casting::CastRequest;
pub use error::{CastError, LedgerError};
pub use ledger::{LedgerStats, VoteLedger};
pub use schedule::{ElectionCalendar, ElectionSchedule, ElectionWindow};
pub use verification::{verify_block, VerificationOutcome, VerificationResult};
