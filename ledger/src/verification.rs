//! Vote Verification Service: lets a voter check their receipt.

use ballotchain_crypto::recompute_hash;
use ballotchain_types::VoteBlock;
use serde::{Deserialize, Serialize};

pub const VERIFIED_MESSAGE: &str =
    "Vote verified successfully! Your vote is securely recorded on the chain.";
pub const MISMATCH_MESSAGE: &str =
    "Warning: Vote hash mismatch detected. The vote may have been tampered with.";
pub const NOT_FOUND_MESSAGE: &str = "No vote found with this verification code";
pub const MALFORMED_MESSAGE: &str =
    "Invalid verification code format. Codes look like XXXX-XXXX-XXXX.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    Verified,
    HashMismatch,
    NotFound,
    MalformedCode,
}

/// Outcome of looking up and re-hashing a voter's block.
///
/// A hash mismatch still carries the stored block so the caller can show
/// what is on record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    pub outcome: VerificationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<VoteBlock>,
    pub message: String,
}

impl VerificationResult {
    pub fn not_found() -> Self {
        Self {
            verified: false,
            outcome: VerificationOutcome::NotFound,
            block: None,
            message: NOT_FOUND_MESSAGE.to_string(),
        }
    }

    pub fn malformed() -> Self {
        Self {
            verified: false,
            outcome: VerificationOutcome::MalformedCode,
            block: None,
            message: MALFORMED_MESSAGE.to_string(),
        }
    }
}

/// Recompute a stored block's hash and compare it with the stored value.
pub fn verify_block(block: VoteBlock) -> VerificationResult {
    if recompute_hash(&block) == block.current_hash {
        VerificationResult {
            verified: true,
            outcome: VerificationOutcome::Verified,
            block: Some(block),
            message: VERIFIED_MESSAGE.to_string(),
        }
    } else {
        tracing::warn!(
            election = %block.election_id,
            block_number = %block.block_number,
            stored = %block.current_hash.short(8),
            "vote hash mismatch"
        );
        VerificationResult {
            verified: false,
            outcome: VerificationOutcome::HashMismatch,
            block: Some(block),
            message: MISMATCH_MESSAGE.to_string(),
        }
    }
}
