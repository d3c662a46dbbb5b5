//! Voter-held verification codes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// A receipt code of the form `XXXX-XXXX-XXXX`.
///
/// Symbols come from [`VerificationCode::ALPHABET`], which leaves out the
/// visually confusable `0`, `O`, `1` and `I`. The code is used purely for
/// lookup and is not part of the block hash.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// The 32-symbol code alphabet.
    pub const ALPHABET: &'static [u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    /// Number of alphabet symbols in a code.
    pub const SYMBOLS: usize = 12;
    /// Symbols between separators.
    pub const GROUP: usize = 4;
    pub const SEPARATOR: char = '-';
    /// Rendered length including separators.
    pub const LEN: usize = Self::SYMBOLS + Self::SYMBOLS / Self::GROUP - 1;

    /// Assemble a code from exactly [`Self::SYMBOLS`] alphabet symbols.
    pub fn from_symbols(symbols: &[u8]) -> Result<Self, TypesError> {
        if symbols.len() != Self::SYMBOLS {
            return Err(TypesError::InvalidVerificationCode(format!(
                "expected {} symbols, got {}",
                Self::SYMBOLS,
                symbols.len()
            )));
        }
        let mut code = String::with_capacity(Self::LEN);
        for (i, &sym) in symbols.iter().enumerate() {
            if !Self::ALPHABET.contains(&sym) {
                return Err(TypesError::InvalidVerificationCode(format!(
                    "symbol {:?} is not in the code alphabet",
                    sym as char
                )));
            }
            if i > 0 && i % Self::GROUP == 0 {
                code.push(Self::SEPARATOR);
            }
            code.push(sym as char);
        }
        Ok(Self(code))
    }

    /// Parse user input: surrounding whitespace is trimmed and letters are
    /// upper-cased before the shape is checked.
    pub fn parse(input: &str) -> Result<Self, TypesError> {
        let normalised = input.trim().to_ascii_uppercase();
        if normalised.len() != Self::LEN {
            return Err(TypesError::InvalidVerificationCode(input.to_string()));
        }
        let symbols: Vec<u8> = normalised
            .split(Self::SEPARATOR)
            .map(|group| {
                if group.len() == Self::GROUP {
                    Ok(group.as_bytes())
                } else {
                    Err(TypesError::InvalidVerificationCode(input.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?
            .concat();
        Self::from_symbols(&symbols)
            .map_err(|_| TypesError::InvalidVerificationCode(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VerificationCode {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VerificationCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for VerificationCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_every_four_symbols() {
        let code = VerificationCode::from_symbols(b"ABCDEFGHJKLM").unwrap();
        assert_eq!(code.as_str(), "ABCD-EFGH-JKLM");
        assert_eq!(code.as_str().len(), VerificationCode::LEN);
    }

    #[test]
    fn rejects_confusable_symbols() {
        assert!(VerificationCode::from_symbols(b"ABCDEFGHJKL0").is_err());
        assert!(VerificationCode::from_symbols(b"OBCDEFGHJKLM").is_err());
        assert!(VerificationCode::from_symbols(b"ABCD1FGHJKLM").is_err());
        assert!(VerificationCode::from_symbols(b"ABCDEFGHIKLM").is_err());
    }

    #[test]
    fn parse_normalises_user_input() {
        let code = VerificationCode::parse("  abcd-efgh-2345\n").unwrap();
        assert_eq!(code.as_str(), "ABCD-EFGH-2345");
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        assert!(VerificationCode::parse("ABCDEFGH2345").is_err());
        assert!(VerificationCode::parse("ABC-DEFGH-2345").is_err());
        assert!(VerificationCode::parse("ABCD_EFGH_2345").is_err());
        assert!(VerificationCode::parse("").is_err());
    }
}
