//! Nullable clock: deterministic time for testing.

use ballotchain_types::{Clock, Timestamp};
use std::sync::atomic::{AtomicI64, Ordering};

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to. Thread-safe so it can back a
/// ledger shared between threads.
pub struct NullClock {
    current_millis: AtomicI64,
}

impl NullClock {
    pub fn new(initial_millis: i64) -> Self {
        Self {
            current_millis: AtomicI64::new(initial_millis),
        }
    }

    /// Start at the given ISO-8601 instant.
    ///
    /// # Panics
    /// Panics if `iso` is not a valid RFC 3339 timestamp.
    pub fn at(iso: &str) -> Self {
        let ts: Timestamp = iso.parse().expect("valid RFC 3339 timestamp");
        Self::new(ts.unix_millis())
    }

    /// Advance time by a number of milliseconds.
    pub fn advance_millis(&self, millis: i64) {
        self.current_millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: i64) {
        self.advance_millis(secs * 1_000);
    }

    /// Set the time to a specific value.
    pub fn set_millis(&self, millis: i64) {
        self.current_millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        let millis = self.current_millis.load(Ordering::SeqCst);
        Timestamp::from_unix_millis(millis).expect("null clock set within chrono's range")
    }
}
