//! SHA-256 hashing of vote blocks.
//!
//! The hash input is the JSON object
//! `{"previousHash","voterId","candidateId","electionId","position","timestamp","nonce"}`
//! with keys in exactly that order and no whitespace. The order is part of the
//! protocol: changing it changes every derived hash.

use ballotchain_types::{
    CandidateId, ElectionId, Position, PreviousHash, Timestamp, UnsealedBlock, VoteBlock, VoteHash,
    VoterId,
};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// The fields a block hash commits to, borrowed from a block.
///
/// `id`, `block_number`, `current_hash` and `verification_code` are not part
/// of the input.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashInput<'a> {
    pub previous_hash: &'a PreviousHash,
    pub voter_id: &'a VoterId,
    pub candidate_id: &'a CandidateId,
    pub election_id: &'a ElectionId,
    pub position: &'a Position,
    pub timestamp: &'a Timestamp,
    pub nonce: u32,
}

impl<'a> HashInput<'a> {
    pub fn from_block(block: &'a VoteBlock) -> Self {
        Self {
            previous_hash: &block.previous_hash,
            voter_id: &block.voter_id,
            candidate_id: &block.candidate_id,
            election_id: &block.election_id,
            position: &block.position,
            timestamp: &block.timestamp,
            nonce: block.nonce,
        }
    }

    pub fn from_unsealed(block: &'a UnsealedBlock) -> Self {
        Self {
            previous_hash: &block.previous_hash,
            voter_id: &block.voter_id,
            candidate_id: &block.candidate_id,
            election_id: &block.election_id,
            position: &block.position,
            timestamp: &block.timestamp,
            nonce: block.nonce,
        }
    }

    /// The canonical byte serialisation fed to the digest.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("hash input contains only strings and an integer")
    }
}

/// Compute a SHA-256 digest of arbitrary data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute the block hash for the given input.
pub fn vote_digest(input: &HashInput<'_>) -> VoteHash {
    VoteHash::new(sha256(&input.canonical_bytes()))
}

/// Recompute a persisted block's hash from its stored fields.
pub fn recompute_hash(block: &VoteBlock) -> VoteHash {
    vote_digest(&HashInput::from_block(block))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fields {
        previous_hash: PreviousHash,
        voter_id: VoterId,
        candidate_id: CandidateId,
        election_id: ElectionId,
        position: Position,
        timestamp: Timestamp,
    }

    fn fields() -> Fields {
        Fields {
            previous_hash: PreviousHash::Genesis,
            voter_id: VoterId::parse("V1").unwrap(),
            candidate_id: CandidateId::parse("C1").unwrap(),
            election_id: ElectionId::parse("E1").unwrap(),
            position: Position::parse("President").unwrap(),
            timestamp: "2024-03-01T09:30:00.000Z".parse().unwrap(),
        }
    }

    fn input(f: &Fields, nonce: u32) -> HashInput<'_> {
        HashInput {
            previous_hash: &f.previous_hash,
            voter_id: &f.voter_id,
            candidate_id: &f.candidate_id,
            election_id: &f.election_id,
            position: &f.position,
            timestamp: &f.timestamp,
            nonce,
        }
    }

    #[test]
    fn canonical_json_field_order() {
        let f = fields();
        let bytes = input(&f, 42).canonical_bytes();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"previousHash":"GENESIS","voterId":"V1","candidateId":"C1","electionId":"E1","position":"President","timestamp":"2024-03-01T09:30:00.000Z","nonce":42}"#
        );
    }

    #[test]
    fn digest_is_sha256_of_canonical_json() {
        let f = fields();
        let i = input(&f, 42);
        assert_eq!(vote_digest(&i).as_bytes(), &sha256(&i.canonical_bytes()));
    }

    #[test]
    fn sha256_known_vector() {
        let h = VoteHash::new(sha256(b"abc"));
        assert_eq!(
            h.to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_deterministic() {
        let f = fields();
        assert_eq!(vote_digest(&input(&f, 7)), vote_digest(&input(&f, 7)));
    }

    #[test]
    fn nonce_changes_digest() {
        let f = fields();
        assert_ne!(vote_digest(&input(&f, 1)), vote_digest(&input(&f, 2)));
    }

    #[test]
    fn every_field_is_committed() {
        let base = fields();
        let h0 = vote_digest(&input(&base, 0));

        let mut f = fields();
        f.previous_hash = PreviousHash::Block(h0);
        assert_ne!(vote_digest(&input(&f, 0)), h0);

        let mut f = fields();
        f.candidate_id = CandidateId::parse("C2").unwrap();
        assert_ne!(vote_digest(&input(&f, 0)), h0);

        let mut f = fields();
        f.position = Position::parse("Treasurer").unwrap();
        assert_ne!(vote_digest(&input(&f, 0)), h0);

        let mut f = fields();
        f.timestamp = "2024-03-01T09:30:00.001Z".parse().unwrap();
        assert_ne!(vote_digest(&input(&f, 0)), h0);
    }
}
