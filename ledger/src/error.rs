use ballotchain_crypto::CryptoError;
use ballotchain_store::StoreError;
use ballotchain_types::{BlockNumber, ElectionId, Position, VoterId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The store could not report the election's tip hash or next block number.
    #[error("chain state unavailable: {0}")]
    ChainStateUnavailable(StoreError),

    #[error("no authenticated voter")]
    NotAuthenticated,

    #[error("randomness unavailable: {0}")]
    Crypto(#[from] CryptoError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Why a vote was not recorded.
///
/// `DuplicateVote` is a business outcome the voter must see as such; only
/// [`CastError::is_retryable`] failures invite another attempt.
#[derive(Debug, Error)]
pub enum CastError {
    #[error("no authenticated voter")]
    NotAuthenticated,

    #[error("election {election} is not open")]
    ElectionNotOpen { election: ElectionId },

    #[error("voter {voter} has already voted for {position} in election {election}")]
    DuplicateVote {
        voter: VoterId,
        election: ElectionId,
        position: Position,
    },

    #[error("chain state unavailable: {0}")]
    ChainStateUnavailable(StoreError),

    /// Another vote claimed this block number first.
    #[error("block {block_number} of election {election} was taken by a concurrent vote")]
    ChainConflict {
        election: ElectionId,
        block_number: BlockNumber,
    },

    #[error("vote could not be written: {0}")]
    StoreWriteFailed(StoreError),

    #[error("randomness unavailable: {0}")]
    Randomness(CryptoError),
}

impl CastError {
    /// Whether rebuilding the block and casting again may succeed.
    ///
    /// Store failures defer to [`StoreError::is_retryable`], so corruption or
    /// an undecodable record is never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            CastError::ChainConflict { .. } => true,
            CastError::ChainStateUnavailable(e) | CastError::StoreWriteFailed(e) => {
                e.is_retryable()
            }
            CastError::NotAuthenticated
            | CastError::ElectionNotOpen { .. }
            | CastError::DuplicateVote { .. }
            | CastError::Randomness(_) => false,
        }
    }

    pub(crate) fn from_insert(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateVoterPosition {
                voter,
                election,
                position,
            } => CastError::DuplicateVote {
                voter,
                election,
                position,
            },
            StoreError::BlockNumberConflict {
                election,
                block_number,
            } => CastError::ChainConflict {
                election,
                block_number,
            },
            other => CastError::StoreWriteFailed(other),
        }
    }
}

impl From<LedgerError> for CastError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ChainStateUnavailable(e) => CastError::ChainStateUnavailable(e),
            LedgerError::NotAuthenticated => CastError::NotAuthenticated,
            LedgerError::Crypto(e) => CastError::Randomness(e),
            LedgerError::Store(e) => CastError::StoreWriteFailed(e),
        }
    }
}
