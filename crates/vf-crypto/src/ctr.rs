//! CTR mode: keystream from encrypting an incrementing 128-bit counter
//!
//! The counter starts at the IV, is treated as a big-endian integer, and
//! advances by one per block consumed — a partial tail still costs one
//! increment. Wraps at 2^128. XOR is its own inverse, so encryption and
//! decryption are identical.

use crate::block::{xor_in_place, AesBlock, Block};
use crate::keys::{Iv, Key};
use crate::try_alloc;
use vf_core::{VfResult, BLOCK_SIZE};

/// Increment a big-endian 128-bit counter with byte-wise carry.
pub(crate) fn increment(counter: &mut Block) {
    for byte in counter.iter_mut().rev() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}

/// Encrypt a whole buffer. Output length equals input length.
pub fn encrypt(key: &Key, iv: &Iv, plaintext: &[u8]) -> VfResult<Vec<u8>> {
    let cipher = AesBlock::new(key);
    let mut out = try_alloc(plaintext.len())?;
    out.copy_from_slice(plaintext);

    let mut counter: Block = *iv.as_bytes();
    let mut chunks = out.chunks_exact_mut(BLOCK_SIZE);
    for chunk in &mut chunks {
        let keystream = cipher.encrypted(&counter);
        xor_in_place(chunk, &keystream);
        increment(&mut counter);
    }
    let tail = chunks.into_remainder();
    if !tail.is_empty() {
        let keystream = cipher.encrypted(&counter);
        xor_in_place(tail, &keystream);
    }
    Ok(out)
}

/// CTR decryption is encryption with the same counter sequence.
pub fn decrypt(key: &Key, iv: &Iv, ciphertext: &[u8]) -> VfResult<Vec<u8>> {
    encrypt(key, iv, ciphertext)
}

/// Streaming CTR transform (self-inverse, shared by both directions).
pub struct CtrStream {
    cipher: AesBlock,
    counter: Block,
    keystream: Block,
    pos: usize,
}

impl CtrStream {
    pub fn new(key: &Key, iv: &Iv) -> Self {
        Self {
            cipher: AesBlock::new(key),
            counter: *iv.as_bytes(),
            keystream: [0u8; BLOCK_SIZE],
            pos: BLOCK_SIZE,
        }
    }

    /// XOR the keystream over `data` in place.
    pub fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            if self.pos == BLOCK_SIZE {
                self.keystream = self.cipher.encrypted(&self.counter);
                increment(&mut self.counter);
                self.pos = 0;
            }
            *byte ^= self.keystream[self.pos];
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_key() -> Key {
        Key::from_hex("2b7e151628aed2a6abf7158809cf4f3c").unwrap()
    }

    // NIST SP 800-38A F.5.1, first block
    #[test]
    fn known_answer_first_block() {
        let iv = Iv::from_hex("f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff").unwrap();
        let plaintext = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let ciphertext = encrypt(&test_key(), &iv, &plaintext).unwrap();
        assert_eq!(hex::encode(&ciphertext), "874d6191b620e3261bef6864990db6ce");
    }

    #[test]
    fn increment_carries_and_wraps() {
        let mut counter = [0u8; 16];
        counter[15] = 0xff;
        increment(&mut counter);
        assert_eq!(counter[15], 0x00);
        assert_eq!(counter[14], 0x01);

        let mut all_ff = [0xffu8; 16];
        increment(&mut all_ff);
        assert_eq!(all_ff, [0u8; 16]);
    }

    /// 257 blocks span the byte carry at block 256; each ciphertext block
    /// must equal P_i ^ Enc(counter + i).
    #[test]
    fn keystream_matches_direct_counter_computation() {
        let key = test_key();
        let iv = Iv::from_bytes([0u8; 16]);
        let blocks = 257usize;
        let plaintext = vec![0u8; blocks * BLOCK_SIZE];
        let ciphertext = encrypt(&key, &iv, &plaintext).unwrap();

        let cipher = AesBlock::new(&key);
        let mut counter: Block = *iv.as_bytes();
        for i in 0..blocks {
            let expected = cipher.encrypted(&counter);
            assert_eq!(
                &ciphertext[i * BLOCK_SIZE..(i + 1) * BLOCK_SIZE],
                &expected[..],
                "block {i}"
            );
            increment(&mut counter);
        }
    }

    #[test]
    fn roundtrip_lengths() {
        let key = test_key();
        let iv = Iv::from_bytes([7u8; 16]);
        for len in [0usize, 1, 15, 16, 17, 255, 4097] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
            let ciphertext = encrypt(&key, &iv, &plaintext).unwrap();
            assert_eq!(ciphertext.len(), len);
            assert_eq!(decrypt(&key, &iv, &ciphertext).unwrap(), plaintext);
        }
    }

    proptest! {
        #[test]
        fn streaming_matches_one_shot(
            data in proptest::collection::vec(any::<u8>(), 0..=300),
            chunk in 1usize..=48,
        ) {
            let key = test_key();
            let iv = Iv::from_bytes([0xA5; 16]);
            let expected = encrypt(&key, &iv, &data).unwrap();

            let mut stream = CtrStream::new(&key, &iv);
            let mut streamed = data.clone();
            for piece in streamed.chunks_mut(chunk) {
                stream.apply(piece);
            }
            prop_assert_eq!(streamed, expected);
        }
    }
}
