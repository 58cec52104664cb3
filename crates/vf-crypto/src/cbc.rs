//! CBC mode: each plaintext block XORed with the previous ciphertext block
//! before encryption, PKCS#7 padded
//!
//! The chain register starts at the IV. Decryption runs the inverse block
//! transform and XORs afterwards, so it needs the previous *ciphertext*
//! block, not the previous plaintext.

use crate::block::{xor_in_place, AesBlock, Block};
use crate::keys::{Iv, Key};
use crate::padding;
use crate::try_alloc;
use vf_core::{VfError, VfResult, BLOCK_SIZE};

/// Encrypt a whole buffer under the given IV.
pub fn encrypt(key: &Key, iv: &Iv, plaintext: &[u8]) -> VfResult<Vec<u8>> {
    let cipher = AesBlock::new(key);
    let mut out = padding::pad(plaintext);
    let mut prev: Block = *iv.as_bytes();

    for chunk in out.chunks_exact_mut(BLOCK_SIZE) {
        xor_in_place(chunk, &prev);
        cipher.encrypt_slice(chunk);
        prev.copy_from_slice(chunk);
    }
    Ok(out)
}

/// Decrypt a whole buffer under the given IV and strip PKCS#7 padding.
pub fn decrypt(key: &Key, iv: &Iv, ciphertext: &[u8]) -> VfResult<Vec<u8>> {
    if ciphertext.len() < BLOCK_SIZE {
        return Err(VfError::InsufficientInput {
            needed: BLOCK_SIZE,
            actual: ciphertext.len(),
        });
    }
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(VfError::InvalidPadding);
    }

    let cipher = AesBlock::new(key);
    let mut padded = try_alloc(ciphertext.len())?;
    let mut prev: Block = *iv.as_bytes();

    for (plain, ct) in padded
        .chunks_exact_mut(BLOCK_SIZE)
        .zip(ciphertext.chunks_exact(BLOCK_SIZE))
    {
        plain.copy_from_slice(ct);
        cipher.decrypt_slice(plain);
        xor_in_place(plain, &prev);
        prev.copy_from_slice(ct);
    }
    padding::unpad(&padded)
}

/// Streaming CBC encryption. The chain register rides across chunk
/// boundaries; only the ≤15-byte tail is carried unencrypted.
pub struct CbcEncryptor {
    cipher: AesBlock,
    prev: Block,
    buf: Block,
    buf_len: usize,
}

impl CbcEncryptor {
    pub fn new(key: &Key, iv: &Iv) -> Self {
        Self {
            cipher: AesBlock::new(key),
            prev: *iv.as_bytes(),
            buf: [0u8; BLOCK_SIZE],
            buf_len: 0,
        }
    }

    pub fn update(&mut self, mut input: &[u8], out: &mut Vec<u8>) {
        while !input.is_empty() {
            let take = (BLOCK_SIZE - self.buf_len).min(input.len());
            self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&input[..take]);
            self.buf_len += take;
            input = &input[take..];

            if self.buf_len == BLOCK_SIZE {
                let mut block = self.buf;
                xor_in_place(&mut block, &self.prev);
                self.cipher.encrypt_block(&mut block);
                self.prev = block;
                out.extend_from_slice(&block);
                self.buf_len = 0;
            }
        }
    }

    pub fn finish(self, out: &mut Vec<u8>) {
        let padded = padding::pad(&self.buf[..self.buf_len]);
        let mut block: Block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(&padded);
        xor_in_place(&mut block, &self.prev);
        self.cipher.encrypt_block(&mut block);
        out.extend_from_slice(&block);
    }
}

/// Streaming CBC decryption with the deferred-final-block rule: a complete
/// ciphertext block is only decrypted once a successor arrives, so the
/// padding decision waits for confirmed end-of-stream.
pub struct CbcDecryptor {
    cipher: AesBlock,
    prev: Block,
    held: Option<Block>,
    buf: Block,
    buf_len: usize,
}

impl CbcDecryptor {
    pub fn new(key: &Key, iv: &Iv) -> Self {
        Self {
            cipher: AesBlock::new(key),
            prev: *iv.as_bytes(),
            held: None,
            buf: [0u8; BLOCK_SIZE],
            buf_len: 0,
        }
    }

    fn drain_held(&mut self, out: &mut Vec<u8>) {
        if let Some(ct) = self.held.take() {
            let mut block = ct;
            self.cipher.decrypt_block(&mut block);
            xor_in_place(&mut block, &self.prev);
            self.prev = ct;
            out.extend_from_slice(&block);
        }
    }

    pub fn update(&mut self, mut input: &[u8], out: &mut Vec<u8>) {
        while !input.is_empty() {
            let take = (BLOCK_SIZE - self.buf_len).min(input.len());
            self.buf[self.buf_len..self.buf_len + take].copy_from_slice(&input[..take]);
            self.buf_len += take;
            input = &input[take..];

            if self.buf_len == BLOCK_SIZE {
                self.drain_held(out);
                self.held = Some(self.buf);
                self.buf_len = 0;
            }
        }
    }

    pub fn finish(mut self, out: &mut Vec<u8>) -> VfResult<()> {
        if self.buf_len != 0 {
            return Err(if self.held.is_none() {
                VfError::InsufficientInput {
                    needed: BLOCK_SIZE,
                    actual: self.buf_len,
                }
            } else {
                VfError::InvalidPadding
            });
        }
        let Some(ct) = self.held.take() else {
            return Err(VfError::InsufficientInput {
                needed: BLOCK_SIZE,
                actual: 0,
            });
        };
        let mut block = ct;
        self.cipher.decrypt_block(&mut block);
        xor_in_place(&mut block, &self.prev);
        let stripped = padding::unpad(&block)?;
        out.extend_from_slice(&stripped);
        Ok(())
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

    // NIST SP 800-38A F.2.1, first two blocks
    #[test]
    fn known_answer_first_blocks() {
        let plaintext = hex::decode(
            "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51",
        )
        .unwrap();
        let ciphertext = encrypt(&test_key(), &test_iv(), &plaintext).unwrap();
        assert_eq!(
            hex::encode(&ciphertext[..32]),
            "7649abac8119b246cee98e9b12e9197d5086cb9b507219ee95db113a917678b2"
        );
    }

    #[test]
    fn roundtrip_lengths() {
        let key = test_key();
        let iv = test_iv();
        for len in [0usize, 1, 15, 16, 17, 47, 128] {
            let plaintext: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
            let ciphertext = encrypt(&key, &iv, &plaintext).unwrap();
            assert_eq!(decrypt(&key, &iv, &ciphertext).unwrap(), plaintext, "len {len}");
        }
    }

    #[test]
    fn wrong_iv_fails_or_garbles() {
        let key = test_key();
        let ciphertext = encrypt(&key, &test_iv(), b"attack at dawn!!").unwrap();
        let other_iv = Iv::from_bytes([0x55; 16]);
        // With a wrong IV the first block decrypts to garbage; padding lives in
        // the last block, so the call may still succeed — it must not return
        // the original plaintext.
        match decrypt(&key, &other_iv, &ciphertext) {
            Ok(plain) => assert_ne!(plain, b"attack at dawn!!"),
            Err(VfError::InvalidPadding) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn tampering_final_block_fails_padding() {
        let key = test_key();
        let iv = test_iv();
        let mut ciphertext = encrypt(&key, &iv, b"sixteen byte msg").unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0x01;
        match decrypt(&key, &iv, &ciphertext) {
            Err(VfError::InvalidPadding) => {}
            Err(e) => panic!("unexpected error: {e}"),
            Ok(plain) => assert_ne!(plain, b"sixteen byte msg"),
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

            let mut enc = CbcEncryptor::new(&key, &iv);
            let mut streamed = Vec::new();
            for piece in data.chunks(chunk) {
                enc.update(piece, &mut streamed);
            }
            enc.finish(&mut streamed);
            prop_assert_eq!(&streamed, &expected);

            let mut dec = CbcDecryptor::new(&key, &iv);
            let mut plain = Vec::new();
            for piece in streamed.chunks(chunk) {
                dec.update(piece, &mut plain);
            }
            dec.finish(&mut plain).unwrap();
            prop_assert_eq!(plain, data);
        }
    }
}
