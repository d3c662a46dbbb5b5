//! Identifier newtypes for voters, candidates, elections and positions.
//!
//! All four are opaque strings owned by the surrounding application. The ledger
//! only requires them to be non-empty; their exact bytes are part of the hash
//! input, so no normalisation is applied beyond rejecting blank values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse a raw string, rejecting empty or whitespace-only values.
            pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
                let s = raw.into();
                if s.trim().is_empty() {
                    return Err(TypesError::EmptyIdentifier { kind: $kind });
                }
                Ok(Self(s))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = TypesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

identifier!(
    /// The authenticated voter casting a vote.
    VoterId,
    "voter id"
);

identifier!(
    /// The candidate a vote is cast for.
    CandidateId,
    "candidate id"
);

identifier!(
    /// The election a chain belongs to. Each election has its own chain.
    ElectionId,
    "election id"
);

identifier!(
    /// The contested position (e.g. "President"). A voter casts at most one
    /// vote per position per election.
    Position,
    "position"
);
