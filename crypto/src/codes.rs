//! Verification code and nonce generation.

use ballotchain_types::VerificationCode;

use crate::{CryptoError, RandomSource};

/// Generate a fresh `XXXX-XXXX-XXXX` verification code.
///
/// Each symbol is one random byte reduced modulo the 32-symbol alphabet. 256
/// is a multiple of 32, so the reduction is unbiased and every code carries
/// 60 bits of entropy (about 1.15e18 codes). Uniqueness is still enforced by
/// the store.
pub fn new_verification_code(random: &impl RandomSource) -> Result<VerificationCode, CryptoError> {
    let mut bytes = [0u8; VerificationCode::SYMBOLS];
    random.fill_bytes(&mut bytes)?;
    let alphabet = VerificationCode::ALPHABET;
    let symbols: Vec<u8> = bytes
        .iter()
        .map(|b| alphabet[usize::from(*b) % alphabet.len()])
        .collect();
    Ok(VerificationCode::from_symbols(&symbols)?)
}

/// Generate a uniformly random 32-bit nonce.
pub fn new_nonce(random: &impl RandomSource) -> Result<u32, CryptoError> {
    let mut bytes = [0u8; 4];
    random.fill_bytes(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}
