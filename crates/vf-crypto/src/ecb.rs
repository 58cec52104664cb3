//! ECB mode: each block encrypted independently, PKCS#7 padded
//!
//! No IV, no chaining. Kept for completeness and interoperability; CBC or
//! CTR should be preferred for anything with structure in the plaintext.

use crate::block::{AesBlock, Block};
use crate::keys::Key;
use crate::padding;
use crate::try_alloc;
use vf_core::{VfError, VfResult, BLOCK_SIZE};

/// Encrypt a whole buffer. Output length is `input` rounded up to the next
/// block boundary (a full extra block when already aligned).
pub fn encrypt(key: &Key, plaintext: &[u8]) -> VfResult<Vec<u8>> {
    let cipher = AesBlock::new(key);
    let mut out = padding::pad(plaintext);
    for chunk in out.chunks_exact_mut(BLOCK_SIZE) {
        cipher.encrypt_slice(chunk);
    }
    Ok(out)
}

/// Decrypt a whole buffer and strip PKCS#7 padding.
pub fn decrypt(key: &Key, ciphertext: &[u8]) -> VfResult<Vec<u8>> {
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
    padded.copy_from_slice(ciphertext);
    for chunk in padded.chunks_exact_mut(BLOCK_SIZE) {
        cipher.decrypt_slice(chunk);
    }
    padding::unpad(&padded)
}

/// Streaming ECB encryption.
///
/// Complete input blocks are encrypted as they arrive; the ≤15-byte tail
/// waits in the carry buffer until `finish` pads it (an empty tail still
/// yields one full padding block).
pub struct EcbEncryptor {
    cipher: AesBlock,
    buf: Block,
    buf_len: usize,
}

impl EcbEncryptor {
    pub fn new(key: &Key) -> Self {
        Self {
            cipher: AesBlock::new(key),
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
                self.cipher.encrypt_block(&mut block);
                out.extend_from_slice(&block);
                self.buf_len = 0;
            }
        }
    }

    pub fn finish(self, out: &mut Vec<u8>) {
        let padded = padding::pad(&self.buf[..self.buf_len]);
        let mut block: Block = [0u8; BLOCK_SIZE];
        block.copy_from_slice(&padded);
        self.cipher.encrypt_block(&mut block);
        out.extend_from_slice(&block);
    }
}

/// Streaming ECB decryption.
///
/// The most recent complete ciphertext block is held back until a
/// successor proves it is not final; `finish` decrypts the held block and
/// validates/strips its padding.
pub struct EcbDecryptor {
    cipher: AesBlock,
    held: Option<Block>,
    buf: Block,
    buf_len: usize,
}

impl EcbDecryptor {
    pub fn new(key: &Key) -> Self {
        Self {
            cipher: AesBlock::new(key),
            held: None,
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
                if let Some(mut prev) = self.held.take() {
                    self.cipher.decrypt_block(&mut prev);
                    out.extend_from_slice(&prev);
                }
                self.held = Some(self.buf);
                self.buf_len = 0;
            }
        }
    }

    pub fn finish(self, out: &mut Vec<u8>) -> VfResult<()> {
        if self.buf_len != 0 {
            // a lone sub-block stream is too short; a trailing fragment
            // after complete blocks is a length/padding violation
            return Err(if self.held.is_none() {
                VfError::InsufficientInput {
                    needed: BLOCK_SIZE,
                    actual: self.buf_len,
                }
            } else {
                VfError::InvalidPadding
            });
        }
        let Some(mut last) = self.held else {
            return Err(VfError::InsufficientInput {
                needed: BLOCK_SIZE,
                actual: 0,
            });
        };
        self.cipher.decrypt_block(&mut last);
        let stripped = padding::unpad(&last)?;
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

    // NIST SP 800-38A F.1.1, first block
    #[test]
    fn known_answer_first_block() {
        let plaintext = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let ciphertext = encrypt(&test_key(), &plaintext).unwrap();
        assert_eq!(
            hex::encode(&ciphertext[..16]),
            "3ad77bb40d7a3660a89ecaf32466ef97"
        );
        // aligned input gains a full padding block
        assert_eq!(ciphertext.len(), 32);
    }

    #[test]
    fn roundtrip_lengths() {
        let key = test_key();
        for len in [0usize, 1, 15, 16, 17, 32, 100] {
            let plaintext: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let ciphertext = encrypt(&key, &plaintext).unwrap();
            assert_eq!(ciphertext.len() % BLOCK_SIZE, 0);
            assert_eq!(decrypt(&key, &ciphertext).unwrap(), plaintext, "len {len}");
        }
    }

    #[test]
    fn decrypt_rejects_short_and_misaligned() {
        let key = test_key();
        assert!(matches!(
            decrypt(&key, b""),
            Err(VfError::InsufficientInput { .. })
        ));
        assert!(matches!(
            decrypt(&key, &[0u8; 17]),
            Err(VfError::InvalidPadding)
        ));
    }

    #[test]
    fn tampered_final_block_fails_padding() {
        let key = test_key();
        let mut ciphertext = encrypt(&key, b"some plaintext").unwrap();
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xFF;
        // PKCS#7 has a small false-accept window after a flip; what must
        // never happen is a clean roundtrip of the original plaintext.
        match decrypt(&key, &ciphertext) {
            Err(VfError::InvalidPadding) => {}
            Err(e) => panic!("unexpected error: {e}"),
            Ok(plain) => assert_ne!(plain, b"some plaintext"),
        }
    }

    proptest! {
        #[test]
        fn streaming_matches_one_shot(
            data in proptest::collection::vec(any::<u8>(), 0..=300),
            chunk in 1usize..=48,
        ) {
            let key = test_key();
            let expected = encrypt(&key, &data).unwrap();

            let mut enc = EcbEncryptor::new(&key);
            let mut streamed = Vec::new();
            for piece in data.chunks(chunk) {
                enc.update(piece, &mut streamed);
            }
            enc.finish(&mut streamed);
            prop_assert_eq!(&streamed, &expected);

            let mut dec = EcbDecryptor::new(&key);
            let mut plain = Vec::new();
            for piece in streamed.chunks(chunk) {
                dec.update(piece, &mut plain);
            }
            dec.finish(&mut plain).unwrap();
            prop_assert_eq!(plain, data);
        }
    }
}
