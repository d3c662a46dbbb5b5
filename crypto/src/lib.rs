//! Cryptographic primitives for the ballotchain vote ledger.
//!
//! - **SHA-256** over a canonical JSON rendering of a block's fields (vote hashes)
//! - Verification code and nonce generation from a pluggable secure random source

pub mod codes;
pub mod error;
pub mod hash;
pub mod random;

pub use codes::{new_nonce, new_verification_code};
pub use error::CryptoError;
pub use hash::{recompute_hash, sha256, vote_digest, HashInput};
pub use random::{OsRandom, RandomSource};
