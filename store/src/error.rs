use ballotchain_types::{BlockNumber, ElectionId, Position, VoterId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    /// The voter already has a block for this position in this election.
    #[error("voter {voter} already has a block for {position} in election {election}")]
    DuplicateVoterPosition {
        voter: VoterId,
        election: ElectionId,
        position: Position,
    },

    /// Another insert already claimed this block number. The chain advanced
    /// between reading the tip and inserting.
    #[error("block {block_number} already exists in election {election}")]
    BlockNumberConflict {
        election: ElectionId,
        block_number: BlockNumber,
    },

    #[error("verification code already in use")]
    DuplicateVerificationCode,

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),

    /// The meta key belongs to the store's own bookkeeping.
    #[error("meta key '{0}' is reserved")]
    ReservedKey(String),
}

impl StoreError {
    /// Whether the failure may succeed if the whole operation is rebuilt and
    /// retried. Duplicate votes never are.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::BlockNumberConflict { .. }
                | StoreError::DuplicateVerificationCode
                | StoreError::Backend(_)
        )
    }
}
