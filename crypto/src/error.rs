use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid base58 encoding: {0}")]
    Base58(String),

    #[error("secret must be 32 or 64 bytes, got {0}")]
    SecretLength(usize),

    #[error("secret public-key half does not match its seed")]
    SecretMismatch,
}
