//! HMAC-SHA256 (RFC 2104) over the in-house SHA-256
//!
//! The key is normalized to one hash-block length: hashed down when longer
//! than 64 bytes, zero-padded when shorter. Both hash contexts are seeded
//! at construction; `update` only ever touches the inner one.

use zeroize::Zeroize;

use crate::sha256::{self, Sha256};

/// MAC length in bytes (same as the underlying digest).
pub const MAC_LEN: usize = sha256::DIGEST_LEN;

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// Streaming HMAC-SHA256 context. Single-use: `finalize` consumes it.
#[derive(Clone)]
pub struct HmacSha256 {
    inner: Sha256,
    outer: Sha256,
}

impl HmacSha256 {
    /// Seed inner and outer contexts with `key⊕ipad` / `key⊕opad`.
    /// Any key length is accepted.
    pub fn new(key: &[u8]) -> Self {
        let mut processed = [0u8; sha256::BLOCK_LEN];
        if key.len() > sha256::BLOCK_LEN {
            let digest = crate::sha256::sha256(key);
            processed[..digest.len()].copy_from_slice(&digest);
        } else {
            processed[..key.len()].copy_from_slice(key);
        }

        let mut pad = [0u8; sha256::BLOCK_LEN];

        let mut inner = Sha256::new();
        for (p, k) in pad.iter_mut().zip(processed.iter()) {
            *p = k ^ IPAD;
        }
        inner.update(&pad);

        let mut outer = Sha256::new();
        for (p, k) in pad.iter_mut().zip(processed.iter()) {
            *p = k ^ OPAD;
        }
        outer.update(&pad);

        pad.zeroize();
        processed.zeroize();

        Self { inner, outer }
    }

    /// Feed message bytes. Only the inner hash sees the message.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// `H((K ⊕ opad) ∥ H((K ⊕ ipad) ∥ m))`
    pub fn finalize(self) -> [u8; MAC_LEN] {
        let inner_digest = self.inner.finalize();
        let mut outer = self.outer;
        outer.update(&inner_digest);
        outer.finalize()
    }
}

/// One-shot HMAC-SHA256.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; MAC_LEN] {
    let mut ctx = HmacSha256::new(key);
    ctx.update(data);
    ctx.finalize()
}
