//! Vote Casting Service: optimistic build, atomic insert.

use ballotchain_crypto::RandomSource;
use ballotchain_store::LedgerStore;
use ballotchain_types::{
    AuditAction, AuditLogEntry, CandidateId, Clock, ElectionId, Position, VerificationCode,
    VoteBlock, VoterId, VoterRegistryEntry,
};

use crate::builder::BlockBuilder;
use crate::ledger::{stat, VoteLedger};
use crate::schedule::ElectionSchedule;
use crate::CastError;

/// A ballot choice for one position.
///
/// `voter` is the identity vouched for by the authentication layer; `None`
/// means the caller is not signed in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CastRequest {
    pub voter: Option<VoterId>,
    pub election: ElectionId,
    pub candidate: CandidateId,
    pub position: Position,
}

impl CastRequest {
    pub fn new(
        voter: VoterId,
        election: ElectionId,
        candidate: CandidateId,
        position: Position,
    ) -> Self {
        Self {
            voter: Some(voter),
            election,
            candidate,
            position,
        }
    }
}

impl<S, C, R, E> VoteLedger<S, C, R, E>
where
    S: LedgerStore,
    C: Clock,
    R: RandomSource,
    E: ElectionSchedule,
{
    /// Record one vote and return the voter's verification code.
    ///
    /// No retry happens here. On a retryable error the caller may call again;
    /// the block is then rebuilt against the new tip.
    pub fn cast_vote(&self, request: &CastRequest) -> Result<VerificationCode, CastError> {
        let result = self.try_cast(request);
        match &result {
            Ok(_) => self.stats.increment(stat::VOTES_CAST),
            Err(CastError::DuplicateVote { .. }) => self.stats.increment(stat::DUPLICATE_VOTES),
            Err(CastError::ChainConflict { .. }) => self.stats.increment(stat::CHAIN_CONFLICTS),
            Err(_) => self.stats.increment(stat::CAST_FAILURES),
        }
        result.map(|block| block.verification_code)
    }

    fn try_cast(&self, request: &CastRequest) -> Result<VoteBlock, CastError> {
        let voter = request.voter.as_ref().ok_or(CastError::NotAuthenticated)?;
        // The block carries the same instant the window was checked at.
        let now = self.clock.now();
        if !self.schedule.is_open(&request.election, now) {
            return Err(CastError::ElectionNotOpen {
                election: request.election.clone(),
            });
        }

        let unsealed = BlockBuilder::new(&self.store, &self.clock, &self.random).build_at(
            &request.election,
            voter,
            &request.candidate,
            &request.position,
            now,
        )?;

        let block = match self.store.insert_block(unsealed) {
            Ok(block) => block,
            Err(err) => {
                let err = CastError::from_insert(err);
                match &err {
                    CastError::DuplicateVote { .. } => tracing::warn!(
                        election = %request.election,
                        position = %request.position,
                        "duplicate vote rejected"
                    ),
                    other => tracing::warn!(
                        election = %request.election,
                        retryable = other.is_retryable(),
                        error = %other,
                        "vote insert failed"
                    ),
                }
                return Err(err);
            }
        };

        tracing::info!(
            election = %block.election_id,
            block_number = %block.block_number,
            hash = %block.current_hash.short(8),
            "vote recorded"
        );
        self.record_side_effects(&block);
        Ok(block)
    }

    /// Registry and audit log updates. The block is already committed, so
    /// failures here are logged and swallowed.
    fn record_side_effects(&self, block: &VoteBlock) {
        let entry = VoterRegistryEntry::voted(
            block.voter_id.clone(),
            block.election_id.clone(),
            block.timestamp,
        );
        if let Err(e) = self.store.upsert_voter_registry(&entry) {
            tracing::warn!(election = %block.election_id, error = %e, "voter registry update failed");
        }

        let audit = AuditLogEntry::new(
            block.election_id.clone(),
            AuditAction::VoteCast,
            block.timestamp,
        )
        .with_block(block.current_hash, block.block_number)
        .with_position(block.position.clone());
        if let Err(e) = self.store.append_audit_entry(&audit) {
            tracing::warn!(election = %block.election_id, error = %e, "audit log append failed");
        }
    }
}
