//! The `VoteLedger` facade: one store, one clock, one random source and one
//! election schedule, shared by every ledger operation.

use std::collections::{BTreeMap, BTreeSet};

use ballotchain_crypto::{OsRandom, RandomSource};
use ballotchain_store::LedgerStore;
use ballotchain_types::{
    AuditAction, AuditLogEntry, Clock, ElectionId, Position, SystemClock, VerificationCode,
    VoteBlock, VoterId,
};
use ballotchain_utils::StatsCounter;
use serde::Serialize;

use crate::audit::{audit_chain, AuditMode, ChainAudit};
use crate::schedule::ElectionSchedule;
use crate::verification::{verify_block, VerificationOutcome, VerificationResult};
use crate::LedgerError;

pub(crate) mod stat {
    pub const VOTES_CAST: &str = "votes_cast";
    pub const DUPLICATE_VOTES: &str = "duplicate_votes";
    pub const CHAIN_CONFLICTS: &str = "chain_conflicts";
    pub const CAST_FAILURES: &str = "cast_failures";
    pub const VERIFICATIONS: &str = "verifications";
    pub const VERIFICATION_MISMATCHES: &str = "verification_mismatches";
    pub const AUDITS: &str = "audits";
    pub const AUDIT_BREAKS: &str = "audit_breaks";

    pub const ALL: &[&str] = &[
        VOTES_CAST,
        DUPLICATE_VOTES,
        CHAIN_CONFLICTS,
        CAST_FAILURES,
        VERIFICATIONS,
        VERIFICATION_MISMATCHES,
        AUDITS,
        AUDIT_BREAKS,
    ];
}

/// Block count plus per-process operation counters.
#[derive(Clone, Debug, Serialize)]
pub struct LedgerStats {
    pub blocks: u64,
    pub counters: BTreeMap<&'static str, u64>,
}

/// Entry point for casting, verifying and auditing votes.
///
/// Holds no chain state of its own; every coordination point is the store's
/// atomic insert, so one ledger can be shared across threads.
pub struct VoteLedger<S, C = SystemClock, R = OsRandom, E = crate::ElectionCalendar> {
    pub(crate) store: S,
    pub(crate) clock: C,
    pub(crate) random: R,
    pub(crate) schedule: E,
    pub(crate) stats: StatsCounter,
}

impl<S, E> VoteLedger<S, SystemClock, OsRandom, E> {
    /// A ledger on the system clock and the OS random source.
    pub fn new(store: S, schedule: E) -> Self {
        Self::with_sources(store, schedule, SystemClock, OsRandom)
    }
}

impl<S, C, R, E> VoteLedger<S, C, R, E> {
    pub fn with_sources(store: S, schedule: E, clock: C, random: R) -> Self {
        Self {
            store,
            clock,
            random,
            schedule,
            stats: StatsCounter::new(stat::ALL),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn schedule(&self) -> &E {
        &self.schedule
    }
}

impl<S, C, R, E> VoteLedger<S, C, R, E>
where
    S: LedgerStore,
    C: Clock,
    R: RandomSource,
    E: ElectionSchedule,
{
    /// Look up a voter's receipt and re-hash the block it points at.
    ///
    /// Input is trimmed and upper-cased first. A malformed code is reported
    /// without touching the store; a store failure is an error, not an
    /// unverified result.
    pub fn verify(&self, code: &str) -> Result<VerificationResult, LedgerError> {
        self.stats.increment(stat::VERIFICATIONS);
        let Ok(code) = VerificationCode::parse(code) else {
            return Ok(VerificationResult::malformed());
        };
        let result = match self.store.find_by_verification_code(&code)? {
            Some(block) => verify_block(block),
            None => VerificationResult::not_found(),
        };
        if result.outcome == VerificationOutcome::HashMismatch {
            self.stats.increment(stat::VERIFICATION_MISMATCHES);
        }
        Ok(result)
    }

    /// Audit every block of an election and record the outcome in its
    /// audit log.
    pub fn audit_election(
        &self,
        election: &ElectionId,
        mode: AuditMode,
    ) -> Result<ChainAudit, LedgerError> {
        let blocks = self.store.blocks_for_election(election)?;
        let audit = audit_chain(&blocks, mode);
        self.stats.increment(stat::AUDITS);

        match audit.first_break {
            None => tracing::info!(
                election = %election,
                mode = %mode,
                blocks = audit.blocks_checked,
                "chain audit passed"
            ),
            Some(brk) => {
                self.stats.increment(stat::AUDIT_BREAKS);
                tracing::warn!(
                    election = %election,
                    mode = %mode,
                    block_number = %brk.block_number,
                    kind = brk.kind.as_str(),
                    "chain audit found a break"
                );
            }
        }

        let mut entry = AuditLogEntry::new(election.clone(), AuditAction::ChainAudited, self.clock.now())
            .with_detail("mode", mode)
            .with_detail("valid", audit.valid())
            .with_detail("blocksChecked", audit.blocks_checked);
        if let Some(brk) = audit.first_break {
            entry = entry
                .with_detail("firstInvalidBlockNumber", brk.block_number)
                .with_detail("breakKind", brk.kind.as_str());
        }
        if let Some(tip) = blocks.iter().max_by_key(|b| b.block_number) {
            entry = entry.with_block(tip.current_hash, tip.block_number);
        }
        if let Err(e) = self.store.append_audit_entry(&entry) {
            tracing::warn!(election = %election, error = %e, "audit log append failed");
        }

        Ok(audit)
    }

    /// Every block the voter cast in an election, by position then block
    /// number.
    pub fn votes_for(
        &self,
        voter: Option<&VoterId>,
        election: &ElectionId,
    ) -> Result<Vec<VoteBlock>, LedgerError> {
        let voter = voter.ok_or(LedgerError::NotAuthenticated)?;
        let mut blocks = self.store.blocks_for_voter(voter, election)?;
        blocks.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then(a.block_number.cmp(&b.block_number))
        });
        Ok(blocks)
    }

    /// Positions the voter has already voted for, from the block set.
    pub fn voted_positions(
        &self,
        voter: Option<&VoterId>,
        election: &ElectionId,
    ) -> Result<BTreeSet<Position>, LedgerError> {
        let voter = voter.ok_or(LedgerError::NotAuthenticated)?;
        Ok(self
            .store
            .blocks_for_voter(voter, election)?
            .into_iter()
            .map(|b| b.position)
            .collect())
    }

    pub fn stats(&self) -> Result<LedgerStats, LedgerError> {
        Ok(LedgerStats {
            blocks: self.store.block_count()?,
            counters: self.stats.snapshot(),
        })
    }
}
