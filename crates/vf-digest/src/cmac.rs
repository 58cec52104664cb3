//! AES-CMAC (NIST SP 800-38B)
//!
//! A CBC-MAC whose final block is masked with subkey K1 (complete block)
//! or K2 (0x80-padded partial block, including the empty message). Because
//! the mask choice depends on whether the final block turns out complete,
//! the most recently completed block is deferred in an `Option<Block>` and
//! only folded into the chain once later data proves it non-final.
//!
//! Subkeys are derived exactly once, at construction: `L = Enc(0^128)`,
//! `K1 = dbl(L)`, `K2 = dbl(K1)`, where `dbl` is a left shift folding the
//! constant 0x87 into the last byte when the vacated top bit was set.

use vf_crypto::block::{xor_in_place, AesBlock, Block};
use vf_crypto::Key;
use vf_core::BLOCK_SIZE;

/// MAC length in bytes (one cipher block).
pub const MAC_LEN: usize = BLOCK_SIZE;

const RB: u8 = 0x87;

/// Doubling in GF(2^128): left shift by one bit, conditionally folding RB.
fn dbl(input: &Block) -> Block {
    let mut out = [0u8; BLOCK_SIZE];
    let mut carry = 0u8;
    for i in (0..BLOCK_SIZE).rev() {
        out[i] = (input[i] << 1) | carry;
        carry = input[i] >> 7;
    }
    if input[0] & 0x80 != 0 {
        out[BLOCK_SIZE - 1] ^= RB;
    }
    out
}

/// Streaming AES-CMAC context. Single-use: `finalize` consumes it.
pub struct AesCmac {
    cipher: AesBlock,
    k1: Block,
    k2: Block,
    /// Running CBC-MAC chain value.
    chain: Block,
    /// Most recently completed block, not yet folded: it may be final.
    held: Option<Block>,
    buf: Block,
    buf_len: usize,
}

impl AesCmac {
    pub fn new(key: &Key) -> Self {
        let cipher = AesBlock::new(key);
        let l = cipher.encrypted(&[0u8; BLOCK_SIZE]);
        let k1 = dbl(&l);
        let k2 = dbl(&k1);
        Self {
            cipher,
            k1,
            k2,
            chain: [0u8; BLOCK_SIZE],
            held: None,
            buf: [0u8; BLOCK_SIZE],
            buf_len: 0,
        }
    }

    /// Fold a confirmed-non-final block into the CBC-MAC chain.
    fn fold(&mut self, block: &Block) {
        let mut x = *block;
        xor_in_place(&mut x, &self.chain);
        self.cipher.encrypt_block(&mut x);
        self.chain = x;
    }

    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let take = (BLOCK_SIZE - self.buf_len).min(data.len());
            self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&data[..take]);
            self.buf_len += take;
            data = &data[take..];

            if self.buf_len == BLOCK_SIZE {
                // The previously held block now has a successor.
                if let Some(prev) = self.held.take() {
                    self.fold(&prev);
                }
                self.held = Some(self.buf);
                self.buf_len = 0;
            }
        }
    }

    /// Consume the deferred/partial final block and produce the MAC.
    pub fn finalize(mut self) -> [u8; MAC_LEN] {
        let mut last: Block;

        if self.buf_len > 0 {
            // Trailing partial bytes prove the held block non-final.
            if let Some(prev) = self.held.take() {
                self.fold(&prev);
            }
            last = [0u8; BLOCK_SIZE];
            last[..self.buf_len].copy_from_slice(&self.buf[..self.buf_len]);
            last[self.buf_len] = 0x80;
            xor_in_place(&mut last, &self.k2);
        } else if let Some(full) = self.held.take() {
            last = full;
            xor_in_place(&mut last, &self.k1);
        } else {
            // Empty message: one 0x80-padded zero block under K2.
            last = [0u8; BLOCK_SIZE];
            last[0] = 0x80;
            xor_in_place(&mut last, &self.k2);
        }

        xor_in_place(&mut last, &self.chain);
        self.cipher.encrypt_block(&mut last);
        last
    }
}

/// One-shot AES-CMAC.
pub fn aes_cmac(key: &Key, data: &[u8]) -> [u8; MAC_LEN] {
    let mut ctx = AesCmac::new(key);
    ctx.update(data);
    ctx.finalize()
}
