//! PKCS#7 padding for the block-aligned modes (ECB, CBC)
//!
//! Every pad byte carries the pad length, 1..=16. An already-aligned input
//! still gains a full block of 16s, so the unpad decision is always
//! unambiguous. Validation is a straight-line scan, not constant-time.

use vf_core::{VfError, VfResult, BLOCK_SIZE};

/// Append PKCS#7 padding. The result length is always a positive multiple
/// of `BLOCK_SIZE`.
pub fn pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - (data.len() % BLOCK_SIZE);
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad_len, pad_len as u8);
    padded
}

/// Validate and strip PKCS#7 padding.
pub fn unpad(padded: &[u8]) -> VfResult<Vec<u8>> {
    if padded.is_empty() || padded.len() % BLOCK_SIZE != 0 {
        return Err(VfError::InvalidPadding);
    }

    let pad_len = *padded.last().unwrap_or(&0) as usize;
    if pad_len == 0 || pad_len > BLOCK_SIZE {
        return Err(VfError::InvalidPadding);
    }

    let data_len = padded.len() - pad_len;
    if padded[data_len..].iter().any(|&b| b as usize != pad_len) {
        return Err(VfError::InvalidPadding);
    }

    Ok(padded[..data_len].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pad_partial_block() {
        let padded = pad(b"hello");
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[..5], b"hello");
        assert!(padded[5..].iter().all(|&b| b == 11));
    }

    #[test]
    fn pad_aligned_input_gains_full_block() {
        let padded = pad(&[0u8; 16]);
        assert_eq!(padded.len(), 32);
        assert!(padded[16..].iter().all(|&b| b == 16));
    }

    #[test]
    fn pad_empty_input() {
        let padded = pad(b"");
        assert_eq!(padded, vec![16u8; 16]);
    }

    #[test]
    fn unpad_rejects_empty_and_misaligned() {
        assert!(matches!(unpad(b""), Err(VfError::InvalidPadding)));
        assert!(matches!(unpad(&[1u8; 15]), Err(VfError::InvalidPadding)));
    }

    #[test]
    fn unpad_rejects_bad_last_byte() {
        let mut block = [4u8; 16];
        block[15] = 0;
        assert!(matches!(unpad(&block), Err(VfError::InvalidPadding)));
        block[15] = 17;
        assert!(matches!(unpad(&block), Err(VfError::InvalidPadding)));
    }

    #[test]
    fn unpad_rejects_inconsistent_pad_bytes() {
        let mut padded = pad(b"abc");
        padded[14] ^= 0x01;
        assert!(matches!(unpad(&padded), Err(VfError::InvalidPadding)));
    }

    proptest! {
        #[test]
        fn unpad_pad_is_identity(data in proptest::collection::vec(any::<u8>(), 0..=256)) {
            let padded = pad(&data);
            prop_assert_eq!(padded.len() % BLOCK_SIZE, 0);
            prop_assert!(!padded.is_empty());
            prop_assert_eq!(unpad(&padded).unwrap(), data);
        }
    }
}
