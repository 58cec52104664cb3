//! vf-digest: hash and MAC primitives for vaultfile
//!
//! - `sha256`: SHA-256 implemented from scratch (Merkle–Damgård); the one
//!   primitive this crate owns end to end
//! - `sha3`: SHA3-256 via the `sha3` crate, wrapped in the same
//!   update/finalize shape
//! - `hmac`: HMAC-SHA256 (RFC 2104) over the in-house SHA-256
//! - `cmac`: AES-CMAC (NIST SP 800-38B) over the AES block primitive
//!
//! Every state machine here is single-use: `finalize` takes `self` by
//! value, so a finished context cannot be updated again.

pub mod cmac;
pub mod hmac;
pub mod sha256;
pub mod sha3;

pub use crate::cmac::{aes_cmac, AesCmac};
pub use crate::hmac::{hmac_sha256, HmacSha256};
pub use crate::sha256::{sha256, Sha256};
pub use crate::sha3::{sha3_256, Sha3_256};

/// Lowercase hex rendering used by every textual digest/MAC interface.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
