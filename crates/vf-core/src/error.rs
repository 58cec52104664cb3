use thiserror::Error;

pub type VfResult<T> = Result<T, VfError>;

#[derive(Debug, Error)]
pub enum VfError {
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid IV length: expected {expected} bytes, got {actual}")]
    InvalidIvLength { expected: usize, actual: usize },

    /// PKCS#7 validation failed on decrypt. Signals a wrong key, corrupted
    /// ciphertext, or IV mismatch; these modes carry no authentication tag,
    /// so this is the closest thing to an authentication failure they have.
    #[error("invalid PKCS#7 padding")]
    InvalidPadding,

    #[error("unsupported algorithm or mode: {0}")]
    Unsupported(String),

    #[error("allocation failure: {0}")]
    Alloc(#[from] std::collections::TryReserveError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input too short: need at least {needed} bytes, got {actual}")]
    InsufficientInput { needed: usize, actual: usize },

    #[error("invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("secure random source unavailable: {0}")]
    Rng(String),
}
