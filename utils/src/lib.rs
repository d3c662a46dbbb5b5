//! Shared utilities for the ballotchain workspace.

pub mod logging;
pub mod stats;

pub use logging::{init_logging, LogFormat, UnknownLogFormat};
pub use stats::StatsCounter;
