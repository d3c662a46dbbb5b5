//! Deterministic stand-ins for the ledger's clock, randomness and storage.
//!
//! `NullClock` only moves when a test advances it, `NullRandom` replays a
//! fixed byte stream, and `NullStore` keeps every store trait in memory with
//! hooks for injected failures, lost races and tampering.

pub mod clock;
pub mod random;
pub mod store;

pub use clock::NullClock;
pub use random::NullRandom;
pub use store::{FailPoint, NullStore};
