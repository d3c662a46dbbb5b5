//! Fundamental types for the ballotchain vote ledger.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! identifiers, hashes, timestamps, verification codes, vote blocks, and the
//! registry / audit side tables.

pub mod block;
pub mod code;
pub mod error;
pub mod hash;
pub mod ids;
pub mod registry;
pub mod time;

pub use block::{BlockId, BlockNumber, UnsealedBlock, VoteBlock};
pub use code::VerificationCode;
pub use error::TypesError;
pub use hash::{PreviousHash, VoteHash};
pub use ids::{CandidateId, ElectionId, Position, VoterId};
pub use registry::{AuditAction, AuditLogEntry, VoterRegistryEntry};
pub use time::{Clock, SystemClock, Timestamp};
