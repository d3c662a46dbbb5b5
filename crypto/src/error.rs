use ballotchain_types::TypesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("secure random source failed: {0}")]
    Randomness(String),

    #[error("generated value rejected: {0}")]
    Types(#[from] TypesError),
}
