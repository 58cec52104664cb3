//! OFB mode: keystream from repeatedly encrypting the feedback register
//!
//! The register starts at the IV and becomes each *keystream* block — never
//! the data. That is the defining difference from CFB: the keystream is
//! independent of plaintext and ciphertext, so encryption and decryption
//! are the same operation.

use crate::block::{xor_in_place, AesBlock, Block};
use crate::keys::{Iv, Key};
use crate::try_alloc;
use vf_core::{VfResult, BLOCK_SIZE};

/// Encrypt a whole buffer. Output length equals input length.
pub fn encrypt(key: &Key, iv: &Iv, plaintext: &[u8]) -> VfResult<Vec<u8>> {
    let cipher = AesBlock::new(key);
    let mut out = try_alloc(plaintext.len())?;
    out.copy_from_slice(plaintext);

    let mut register: Block = *iv.as_bytes();
    let mut chunks = out.chunks_exact_mut(BLOCK_SIZE);
    for chunk in &mut chunks {
        register = cipher.encrypted(&register);
        xor_in_place(chunk, &register);
    }
    let tail = chunks.into_remainder();
    if !tail.is_empty() {
        register = cipher.encrypted(&register);
        xor_in_place(tail, &register);
    }
    Ok(out)
}

/// OFB decryption is encryption: XOR with the same keystream.
pub fn decrypt(key: &Key, iv: &Iv, ciphertext: &[u8]) -> VfResult<Vec<u8>> {
    encrypt(key, iv, ciphertext)
}

/// Streaming OFB transform (self-inverse, shared by both directions).
pub struct OfbStream {
    cipher: AesBlock,
    register: Block,
    pos: usize,
}

impl OfbStream {
    pub fn new(key: &Key, iv: &Iv) -> Self {
        Self {
            cipher: AesBlock::new(key),
            register: *iv.as_bytes(),
            pos: BLOCK_SIZE,
        }
    }

    /// XOR the keystream over `data` in place.
    pub fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            if self.pos == BLOCK_SIZE {
                self.register = self.cipher.encrypted(&self.register);
                self.pos = 0;
            }
            *byte ^= self.register[self.pos];
            self.pos += 1;
        }
    }
}
