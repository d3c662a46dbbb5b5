//! Daemon configuration with TOML file support.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ballotchain_ledger::{AuditMode, ElectionCalendar, ElectionWindow};
use ballotchain_utils::LogFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for the `ballotchain` binary.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; command-line
/// flags and `BALLOTCHAIN_*` variables are layered on top in `main`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Attempts per cast before a retryable failure is reported.
    #[serde(default = "default_max_cast_attempts")]
    pub max_cast_attempts: u32,

    /// Default mode for `audit`: "full" or "window".
    #[serde(default)]
    pub audit_mode: AuditMode,

    /// Voting windows. Elections not listed here are closed.
    #[serde(default)]
    pub elections: Vec<ElectionWindow>,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./ballotchain_data")
}

fn default_map_size_mb() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_cast_attempts() -> u32 {
    3
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("DaemonConfig is always serializable to TOML")
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }

    /// Reject settings the ledger cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cast_attempts == 0 {
            return Err(ConfigError::Invalid("max_cast_attempts must be at least 1".into()));
        }
        if self.map_size_mb == 0 {
            return Err(ConfigError::Invalid("map_size_mb must be positive".into()));
        }
        let mut seen = HashSet::new();
        for window in &self.elections {
            if !seen.insert(&window.election_id) {
                return Err(ConfigError::Invalid(format!(
                    "election {} is configured twice",
                    window.election_id
                )));
            }
            if window.start.is_some_and(|s| s >= window.end) {
                return Err(ConfigError::Invalid(format!(
                    "election {} starts after it ends",
                    window.election_id
                )));
            }
        }
        Ok(())
    }

    pub fn calendar(&self) -> ElectionCalendar {
        self.elections.iter().cloned().collect()
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            max_cast_attempts: default_max_cast_attempts(),
            audit_mode: AuditMode::default(),
            elections: Vec::new(),
        }
    }
}
