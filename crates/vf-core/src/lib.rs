//! vf-core: shared vocabulary for the vaultfile workspace
//!
//! - `error`: the `VfError` taxonomy every crate returns
//! - `types`: cipher modes and hash algorithm selectors
//! - `config`: TOML configuration for the CLI tool

pub mod config;
pub mod error;
pub mod types;

pub use error::{VfError, VfResult};
pub use types::{HashAlgorithm, Mode};

/// AES block size in bytes; the atomic unit every mode operates on.
pub const BLOCK_SIZE: usize = 16;

/// AES-128 key size in bytes.
pub const KEY_SIZE: usize = 16;

/// IV / initial counter size in bytes (one block).
pub const IV_SIZE: usize = 16;

/// Allocate a zero-filled buffer, surfacing allocation failure as a typed
/// error instead of aborting the process.
pub fn try_alloc(len: usize) -> VfResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)?;
    buf.resize(len, 0);
    Ok(buf)
}
