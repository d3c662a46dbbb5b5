//! ballotchain: cast, verify and audit votes against a local LMDB ledger.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use ballotchain_ledger::{AuditMode, CastError, CastRequest, VoteLedger};
use ballotchain_store::{AuditLogStore, VoterRegistryStore};
use ballotchain_store_lmdb::{LmdbEnvironment, DEFAULT_MAX_DBS};
use ballotchain_types::{CandidateId, ElectionId, Position, VerificationCode, VoterId};
use ballotchain_utils::LogFormat;
use clap::Parser;
use serde::Serialize;

use crate::config::DaemonConfig;

#[derive(Parser)]
#[command(name = "ballotchain", about = "Hash-chained vote ledger")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "BALLOTCHAIN_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for ledger storage.
    #[arg(long, env = "BALLOTCHAIN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// LMDB map size in MiB.
    #[arg(long, env = "BALLOTCHAIN_MAP_SIZE_MB")]
    map_size_mb: Option<usize>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BALLOTCHAIN_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BALLOTCHAIN_LOG_LEVEL")]
    log_level: Option<String>,

    /// Attempts per cast before giving up on retryable failures.
    #[arg(long, env = "BALLOTCHAIN_MAX_CAST_ATTEMPTS")]
    max_cast_attempts: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ModeArg {
    Full,
    Window,
}

impl From<ModeArg> for AuditMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Full => AuditMode::FullChain,
            ModeArg::Window => AuditMode::Window,
        }
    }
}

#[derive(clap::Subcommand)]
enum Command {
    /// Cast a vote on behalf of an authenticated voter.
    Cast {
        #[arg(long)]
        voter: String,
        #[arg(long)]
        election: String,
        #[arg(long)]
        candidate: String,
        #[arg(long)]
        position: String,
    },
    /// Look up a vote by verification code and check its hash.
    Verify { code: String },
    /// Check an election's chain linkage and block hashes.
    Audit {
        #[arg(long)]
        election: String,
        /// Overrides `audit_mode` from the configuration.
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// List a voter's votes in an election.
    Votes {
        #[arg(long)]
        voter: String,
        #[arg(long)]
        election: String,
    },
    /// Print an election's audit log.
    AuditLog {
        #[arg(long)]
        election: String,
    },
    /// Report block count and LMDB integrity.
    Status,
    /// Print the effective configuration as TOML.
    Config,
}

/// Merge the config file (if any) with CLI flags and env vars.
fn effective_config(cli: &Cli) -> anyhow::Result<DaemonConfig> {
    let mut config = match &cli.config {
        Some(path) => DaemonConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DaemonConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(mb) = cli.map_size_mb {
        config.map_size_mb = mb;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(attempts) = cli.max_cast_attempts {
        config.max_cast_attempts = attempts;
    }
    config.validate()?;
    Ok(config)
}

fn open_ledger(config: &DaemonConfig) -> anyhow::Result<VoteLedger<LmdbEnvironment>> {
    let env = LmdbEnvironment::open(&config.data_dir, DEFAULT_MAX_DBS, config.map_size_bytes())
        .with_context(|| format!("opening ledger at {}", config.data_dir.display()))?;

    let report = env.check_integrity()?;
    if report.is_healthy() {
        tracing::debug!(
            databases = report.databases_checked,
            entries = report.total_entries,
            "integrity check passed"
        );
    } else {
        for error in &report.errors {
            tracing::warn!(%error, "integrity check");
        }
    }
    Ok(VoteLedger::new(env, config.calendar()))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CastOutcome {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    verification_code: Option<VerificationCode>,
    attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Cast, retrying retryable failures up to `max_attempts` times. A duplicate
/// vote is final on the first attempt.
fn cast_with_retry(
    ledger: &VoteLedger<LmdbEnvironment>,
    request: &CastRequest,
    max_attempts: u32,
) -> (Result<VerificationCode, CastError>, u32) {
    let mut attempt = 1;
    loop {
        match ledger.cast_vote(request) {
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                tracing::warn!(attempt, error = %e, "cast failed, retrying");
                attempt += 1;
            }
            result => return (result, attempt),
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = effective_config(&cli)?;
    ballotchain_utils::init_logging(config.log_format, &config.log_level);

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string());
        }
        Command::Cast {
            voter,
            election,
            candidate,
            position,
        } => {
            let request = CastRequest::new(
                VoterId::parse(voter)?,
                ElectionId::parse(election)?,
                CandidateId::parse(candidate)?,
                Position::parse(position)?,
            );
            let ledger = open_ledger(&config)?;
            let (result, attempts) = cast_with_retry(&ledger, &request, config.max_cast_attempts);
            match result {
                Ok(code) => print_json(&CastOutcome {
                    status: "recorded",
                    verification_code: Some(code),
                    attempts,
                    message: None,
                })?,
                Err(e @ CastError::DuplicateVote { .. }) => {
                    print_json(&CastOutcome {
                        status: "duplicate_vote",
                        verification_code: None,
                        attempts,
                        message: Some(e.to_string()),
                    })?;
                    return Ok(ExitCode::from(2));
                }
                Err(e @ CastError::ElectionNotOpen { .. }) | Err(e @ CastError::NotAuthenticated) => {
                    print_json(&CastOutcome {
                        status: "rejected",
                        verification_code: None,
                        attempts,
                        message: Some(e.to_string()),
                    })?;
                    return Ok(ExitCode::from(2));
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("vote not recorded after {attempts} attempt(s); try again")
                    })
                }
            }
        }
        Command::Verify { code } => {
            let ledger = open_ledger(&config)?;
            let result = ledger.verify(&code)?;
            print_json(&result)?;
            if !result.verified {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Audit { election, mode } => {
            let ledger = open_ledger(&config)?;
            let mode = mode.map_or(config.audit_mode, AuditMode::from);
            let audit = ledger.audit_election(&ElectionId::parse(election)?, mode)?;
            print_json(&serde_json::json!({
                "valid": audit.valid(),
                "firstInvalidBlockNumber": audit.first_invalid_block_number(),
                "audit": audit,
            }))?;
            if !audit.valid() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Votes { voter, election } => {
            let ledger = open_ledger(&config)?;
            let voter = VoterId::parse(voter)?;
            let election = ElectionId::parse(election)?;
            let votes = ledger.votes_for(Some(&voter), &election)?;
            let registry = ledger.store().voter_registry(&voter, &election)?;
            print_json(&serde_json::json!({
                "votes": votes,
                "registry": registry,
            }))?;
        }
        Command::AuditLog { election } => {
            let ledger = open_ledger(&config)?;
            let entries = ledger.store().audit_log(&ElectionId::parse(election)?)?;
            print_json(&entries)?;
        }
        Command::Status => {
            let ledger = open_ledger(&config)?;
            let report = ledger.store().check_integrity()?;
            let stats = ledger.stats()?;
            print_json(&serde_json::json!({
                "dataDir": config.data_dir,
                "blocks": stats.blocks,
                "databasesChecked": report.databases_checked,
                "totalEntries": report.total_entries,
                "healthy": report.is_healthy(),
                "errors": report.errors,
            }))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
