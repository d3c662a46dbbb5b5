//! Vote hash types: the 256-bit block digest and the `previousHash` link.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// A 32-byte SHA-256 digest identifying one vote block.
///
/// Rendered as 64 lowercase hex characters everywhere it leaves the process.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoteHash([u8; 32]);

impl VoteHash {
    /// Length of the hex rendering.
    pub const HEX_LEN: usize = 64;

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Truncated form for display: the first `len` hex characters, an
    /// ellipsis, then the last four.
    pub fn short(&self, len: usize) -> String {
        let full = self.to_hex();
        let head = len.min(Self::HEX_LEN);
        format!("{}...{}", &full[..head], &full[Self::HEX_LEN - 4..])
    }
}

impl fmt::Debug for VoteHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VoteHash({}\u{2026})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for VoteHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for VoteHash {
    type Err = TypesError;

    /// Accepts exactly 64 lowercase hex characters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::HEX_LEN || s.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(TypesError::InvalidHash(s.to_string()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| TypesError::InvalidHash(s.to_string()))?;
        Ok(Self(bytes))
    }
}

/// The link from a block to its predecessor in the same election's chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviousHash {
    /// The first block of an election's chain.
    Genesis,
    /// The `current_hash` of the preceding block.
    Block(VoteHash),
}

impl PreviousHash {
    /// Wire form of [`PreviousHash::Genesis`].
    pub const GENESIS: &'static str = "GENESIS";

    pub fn is_genesis(&self) -> bool {
        matches!(self, PreviousHash::Genesis)
    }

    /// Whether this link points at the block with the given hash.
    pub fn links_to(&self, hash: &VoteHash) -> bool {
        matches!(self, PreviousHash::Block(h) if h == hash)
    }

    /// Display form; `GENESIS` is never truncated.
    pub fn short(&self, len: usize) -> String {
        match self {
            PreviousHash::Genesis => Self::GENESIS.to_string(),
            PreviousHash::Block(h) => h.short(len),
        }
    }
}

impl From<VoteHash> for PreviousHash {
    fn from(hash: VoteHash) -> Self {
        PreviousHash::Block(hash)
    }
}

impl fmt::Debug for PreviousHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviousHash::Genesis => f.write_str("Genesis"),
            PreviousHash::Block(h) => write!(f, "{h:?}"),
        }
    }
}

impl fmt::Display for PreviousHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviousHash::Genesis => f.write_str(Self::GENESIS),
            PreviousHash::Block(h) => fmt::Display::fmt(h, f),
        }
    }
}

impl FromStr for PreviousHash {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::GENESIS {
            Ok(PreviousHash::Genesis)
        } else {
            s.parse().map(PreviousHash::Block)
        }
    }
}

// Both hash types travel as their string forms so that JSON output matches
// the persisted row layout.

struct HashStrVisitor<T>(std::marker::PhantomData<T>);

impl<'de, T> Visitor<'de> for HashStrVisitor<T>
where
    T: FromStr<Err = TypesError>,
{
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a 64-character hex digest or \"GENESIS\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        v.parse().map_err(E::custom)
    }
}

impl Serialize for VoteHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for VoteHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(HashStrVisitor(std::marker::PhantomData))
    }
}

impl Serialize for PreviousHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PreviousHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(HashStrVisitor(std::marker::PhantomData))
    }
}
