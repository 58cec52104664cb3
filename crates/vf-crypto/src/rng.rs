//! CSPRNG-backed key/IV generation and the advisory weak-key heuristic
//!
//! All randomness comes from the operating system RNG. When the source is
//! unavailable the functions fail; nothing falls back to a weaker
//! generator.

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::warn;

use crate::keys::{Iv, Key};
use vf_core::{VfError, VfResult, IV_SIZE, KEY_SIZE};

/// Fill a fresh buffer with `n` cryptographically secure random bytes.
pub fn random_bytes(n: usize) -> VfResult<Vec<u8>> {
    let mut buf = crate::try_alloc(n)?;
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| VfError::Rng(e.to_string()))?;
    Ok(buf)
}

/// Generate a random AES-128 key, warning (but not failing) if the draw
/// happens to match a weak pattern.
pub fn generate_key() -> VfResult<Key> {
    let mut bytes = [0u8; KEY_SIZE];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| VfError::Rng(e.to_string()))?;
    if is_weak_key(&bytes) {
        warn!("generated key matches a weak pattern; consider regenerating");
    }
    Ok(Key::from_bytes(bytes))
}

/// Generate a random IV / initial counter value.
pub fn generate_iv() -> VfResult<Iv> {
    let mut bytes = [0u8; IV_SIZE];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| VfError::Rng(e.to_string()))?;
    Ok(Iv::from_bytes(bytes))
}

/// Advisory weak-key check. Flags all-zero keys, strictly increasing or
/// decreasing byte runs, and 2-byte repeating patterns. Never blocks an
/// operation; callers decide whether to warn.
pub fn is_weak_key(key: &[u8]) -> bool {
    if key.is_empty() {
        return false;
    }

    if key.iter().all(|&b| b == 0) {
        return true;
    }

    if key
        .windows(2)
        .all(|w| w[0].checked_add(1) == Some(w[1]))
    {
        return true;
    }

    if key
        .windows(2)
        .all(|w| w[0].checked_sub(1) == Some(w[1]))
    {
        return true;
    }

    if key.len() >= 2 && key.iter().enumerate().all(|(i, &b)| b == key[i % 2]) {
        return true;
    }

    false
}
