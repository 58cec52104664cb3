//! Single-block AES-128 transform
//!
//! The block cipher itself comes from the `aes` crate; everything above it
//! (chaining, padding, counters) is ours. CFB/OFB/CTR and CMAC only ever
//! run the cipher forward, so decryption in those modes goes through
//! `encrypted`/`encrypt_block` too.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;

use crate::keys::Key;
use vf_core::BLOCK_SIZE;

/// A 16-byte cipher block.
pub type Block = [u8; BLOCK_SIZE];

/// AES-128 keyed for single-block encrypt/decrypt.
pub struct AesBlock {
    cipher: Aes128,
}

impl AesBlock {
    pub fn new(key: &Key) -> Self {
        let cipher = Aes128::new(GenericArray::from_slice(key.as_bytes()));
        Self { cipher }
    }

    pub fn encrypt_block(&self, block: &mut Block) {
        self.cipher
            .encrypt_block(GenericArray::from_mut_slice(block));
    }

    pub fn decrypt_block(&self, block: &mut Block) {
        self.cipher
            .decrypt_block(GenericArray::from_mut_slice(block));
    }

    /// Encrypt a slice of exactly `BLOCK_SIZE` bytes in place.
    ///
    /// Callers hand in `chunks_exact` slices; anything else is a logic bug.
    pub fn encrypt_slice(&self, block: &mut [u8]) {
        self.cipher
            .encrypt_block(GenericArray::from_mut_slice(block));
    }

    /// Decrypt a slice of exactly `BLOCK_SIZE` bytes in place.
    pub fn decrypt_slice(&self, block: &mut [u8]) {
        self.cipher
            .decrypt_block(GenericArray::from_mut_slice(block));
    }

    /// Encrypt a copy, leaving the input intact. Used to derive keystream
    /// blocks from chain registers.
    pub fn encrypted(&self, block: &Block) -> Block {
        let mut out = *block;
        self.encrypt_block(&mut out);
        out
    }
}

/// `dst[i] ^= src[i]` over the shorter of the two lengths.
pub fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= *s;
    }
}
