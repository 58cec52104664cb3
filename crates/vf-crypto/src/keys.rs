//! Key and IV value types
//!
//! Keys are exactly 16 bytes (AES-128), zeroized on drop, never printed.
//! IVs are public values: they travel in the clear as the first 16 bytes
//! of every IV-mode artifact, so they get ordinary Debug/Display.

use zeroize::Zeroize;

use vf_core::{VfError, VfResult, IV_SIZE, KEY_SIZE};

/// An AES-128 key. Zeroized on drop.
#[derive(Clone)]
pub struct Key {
    bytes: [u8; KEY_SIZE],
}

impl Key {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn from_slice(slice: &[u8]) -> VfResult<Self> {
        let bytes: [u8; KEY_SIZE] =
            slice
                .try_into()
                .map_err(|_| VfError::InvalidKeyLength {
                    expected: KEY_SIZE,
                    actual: slice.len(),
                })?;
        Ok(Self { bytes })
    }

    /// Parse the textual form: exactly 32 hex characters.
    pub fn from_hex(hex_str: &str) -> VfResult<Self> {
        if hex_str.len() != KEY_SIZE * 2 {
            return Err(VfError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: hex_str.len() / 2,
            });
        }
        let mut decoded = hex::decode(hex_str)?;
        let key = Self::from_slice(&decoded)?;
        decoded.zeroize();
        Ok(key)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key").field("bytes", &"[REDACTED]").finish()
    }
}

/// A 16-byte initialization vector (or initial CTR counter value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Iv {
    bytes: [u8; IV_SIZE],
}

impl Iv {
    pub fn from_bytes(bytes: [u8; IV_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn from_slice(slice: &[u8]) -> VfResult<Self> {
        let bytes: [u8; IV_SIZE] = slice.try_into().map_err(|_| VfError::InvalidIvLength {
            expected: IV_SIZE,
            actual: slice.len(),
        })?;
        Ok(Self { bytes })
    }

    /// Parse the textual form: exactly 32 hex characters.
    pub fn from_hex(hex_str: &str) -> VfResult<Self> {
        if hex_str.len() != IV_SIZE * 2 {
            return Err(VfError::InvalidIvLength {
                expected: IV_SIZE,
                actual: hex_str.len() / 2,
            });
        }
        let decoded = hex::decode(hex_str)?;
        Self::from_slice(&decoded)
    }

    pub fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.bytes
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.bytes)
    }
}

impl std::fmt::Display for Iv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
