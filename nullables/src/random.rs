//! Nullable random: deterministic random bytes.

use ballotchain_crypto::{CryptoError, RandomSource};
use std::sync::Mutex;

enum Pattern {
    /// A fixed sequence, wrapping around at the end.
    Fixed(Vec<u8>),
    /// Offset within each 16-byte window, shifted by one base-32 digit of
    /// the window index.
    Counting,
}

impl Pattern {
    fn byte_at(&self, n: usize) -> u8 {
        match self {
            Pattern::Fixed(bytes) => bytes[n % bytes.len()],
            Pattern::Counting => {
                let window = n / 16;
                let offset = n % 16;
                let digit = (window >> (5 * (offset % 4))) & 31;
                (offset + digit) as u8
            }
        }
    }
}

/// A deterministic random source for testing.
///
/// Nonces and verification codes drawn from it are reproducible across runs.
pub struct NullRandom {
    pattern: Pattern,
    cursor: Mutex<usize>,
}

impl NullRandom {
    /// Create with a sequence of deterministic bytes, repeated forever.
    ///
    /// # Panics
    /// Panics if `bytes` is empty.
    pub fn new(bytes: Vec<u8>) -> Self {
        assert!(!bytes.is_empty(), "NullRandom needs at least one byte");
        Self {
            pattern: Pattern::Fixed(bytes),
            cursor: Mutex::new(0),
        }
    }

    /// A source that returns the same byte for every request.
    pub fn constant(value: u8) -> Self {
        Self::new(vec![value])
    }

    /// A source whose first 16 bytes count up from 0.
    ///
    /// Each later 16-byte window (one nonce plus one code) is shifted by the
    /// window index, so consecutive draws never repeat a verification code
    /// for the first 2^20 windows.
    pub fn counting() -> Self {
        Self {
            pattern: Pattern::Counting,
            cursor: Mutex::new(0),
        }
    }

    /// Number of bytes handed out so far.
    pub fn consumed(&self) -> usize {
        *self.cursor.lock().unwrap()
    }
}

impl RandomSource for NullRandom {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
        let mut cursor = self.cursor.lock().unwrap();
        for b in dest.iter_mut() {
            *b = self.pattern.byte_at(*cursor);
            *cursor += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballotchain_crypto::{new_nonce, new_verification_code};
    use std::collections::HashSet;

    #[test]
    fn sequence_wraps() {
        let random = NullRandom::new(vec![1, 2, 3]);
        let mut buf = [0u8; 5];
        random.fill_bytes(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 1, 2]);
        assert_eq!(random.consumed(), 5);
    }

    #[test]
    fn codes_are_reproducible() {
        let a = new_verification_code(&NullRandom::counting()).unwrap();
        let b = new_verification_code(&NullRandom::counting()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "ABCD-EFGH-JKLM");
    }

    #[test]
    fn counting_never_repeats_a_code() {
        let random = NullRandom::counting();
        let mut seen = HashSet::new();
        for _ in 0..2_000 {
            new_nonce(&random).unwrap();
            let code = new_verification_code(&random).unwrap();
            assert!(seen.insert(code.clone()), "repeated {code}");
        }
        assert_eq!(random.consumed(), 2_000 * 16);
    }
}
