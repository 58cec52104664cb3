//! CFB mode (full-block feedback): keystream from encrypting the previous
//! ciphertext block, no padding
//!
//! The shift register starts at the IV and is replaced by each ciphertext
//! block. Both directions run the block cipher forward; a final short
//! block XORs only the remaining bytes, so ciphertext length equals
//! plaintext length.

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
        let keystream = cipher.encrypted(&register);
        xor_in_place(chunk, &keystream);
        register.copy_from_slice(chunk);
    }
    let tail = chunks.into_remainder();
    if !tail.is_empty() {
        let keystream = cipher.encrypted(&register);
        xor_in_place(tail, &keystream);
    }
    Ok(out)
}

/// Decrypt a whole buffer. Same forward transform; the register takes the
/// incoming ciphertext block instead of the produced one.
pub fn decrypt(key: &Key, iv: &Iv, ciphertext: &[u8]) -> VfResult<Vec<u8>> {
    let cipher = AesBlock::new(key);
    let mut out = try_alloc(ciphertext.len())?;
    out.copy_from_slice(ciphertext);

    let mut register: Block = *iv.as_bytes();
    let mut chunks = out.chunks_exact_mut(BLOCK_SIZE);
    let mut offset = 0;
    for chunk in &mut chunks {
        let keystream = cipher.encrypted(&register);
        register.copy_from_slice(&ciphertext[offset..offset + BLOCK_SIZE]);
        xor_in_place(chunk, &keystream);
        offset += BLOCK_SIZE;
    }
    let tail = chunks.into_remainder();
    if !tail.is_empty() {
        let keystream = cipher.encrypted(&register);
        xor_in_place(tail, &keystream);
    }
    Ok(out)
}

/// Streaming CFB encryption; correct for any input slicing, including
/// mid-block chunk boundaries.
pub struct CfbEncryptor {
    cipher: AesBlock,
    /// IV, then progressively overwritten with the current ciphertext block.
    register: Block,
    keystream: Block,
    pos: usize,
}

impl CfbEncryptor {
    pub fn new(key: &Key, iv: &Iv) -> Self {
        Self {
            cipher: AesBlock::new(key),
            register: *iv.as_bytes(),
            keystream: [0u8; BLOCK_SIZE],
            pos: BLOCK_SIZE,
        }
    }

    /// Encrypt in place.
    pub fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            if self.pos == BLOCK_SIZE {
                // register holds a complete ciphertext block (or the IV)
                self.keystream = self.cipher.encrypted(&self.register);
                self.pos = 0;
            }
            let c = *byte ^ self.keystream[self.pos];
            self.register[self.pos] = c;
            *byte = c;
            self.pos += 1;
        }
    }
}

/// Streaming CFB decryption.
pub struct CfbDecryptor {
    cipher: AesBlock,
    register: Block,
    keystream: Block,
    pos: usize,
}

impl CfbDecryptor {
    pub fn new(key: &Key, iv: &Iv) -> Self {
        Self {
            cipher: AesBlock::new(key),
            register: *iv.as_bytes(),
            keystream: [0u8; BLOCK_SIZE],
            pos: BLOCK_SIZE,
        }
    }

    /// Decrypt in place.
    pub fn apply(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            if self.pos == BLOCK_SIZE {
                self.keystream = self.cipher.encrypted(&self.register);
                self.pos = 0;
            }
            let c = *byte;
            self.register[self.pos] = c;
            *byte = c ^ self.keystream[self.pos];
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

    fn test_iv() -> Iv {
        Iv::from_hex("000102030405060708090a0b0c0d0e0f").unwrap()
    }

    // NIST SP 800-38A F.3.13 (CFB128), first block
    #[test]
    fn known_answer_first_block() {
        let plaintext = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let ciphertext = encrypt(&test_key(), &test_iv(), &plaintext).unwrap();
        assert_eq!(hex::encode(&ciphertext), "3b3fd92eb72dad20333449f8e83cfb4a");
    }

    #[test]
    fn length_preserved_and_roundtrips() {
        let key = test_key();
        let iv = test_iv();
        for len in [0usize, 1, 15, 16, 17, 33, 257] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i * 3) as u8).collect();
            let ciphertext = encrypt(&key, &iv, &plaintext).unwrap();
            assert_eq!(ciphertext.len(), len);
            assert_eq!(decrypt(&key, &iv, &ciphertext).unwrap(), plaintext, "len {len}");
        }
    }

    proptest! {
        #[test]
        fn streaming_matches_one_shot(
            data in proptest::collection::vec(any::<u8>(), 0..=300),
            chunk in 1usize..=48,
        ) {
            let key = test_key();
            let iv = test_iv();
            let expected = encrypt(&key, &iv, &data).unwrap();

            let mut enc = CfbEncryptor::new(&key, &iv);
            let mut streamed = data.clone();
            for piece in streamed.chunks_mut(chunk) {
                enc.apply(piece);
            }
            prop_assert_eq!(&streamed, &expected);

            let mut dec = CfbDecryptor::new(&key, &iv);
            let mut plain = streamed.clone();
            for piece in plain.chunks_mut(chunk) {
                dec.apply(piece);
            }
            prop_assert_eq!(plain, data);
        }
    }
}
