//! vf-crypto: AES-128 cipher core for vaultfile
//!
//! Five modes of operation over a single-block AES-128 primitive:
//!
//! ```text
//! ECB  C_i = Enc(P_i)                          padded, no IV
//! CBC  C_i = Enc(P_i ⊕ C_{i-1}), C_0 = IV     padded
//! CFB  C_i = P_i ⊕ Enc(R_i), R_{i+1} = C_i    length-preserving
//! OFB  C_i = P_i ⊕ Enc(R_i), R_{i+1} = Enc(R_i)
//! CTR  C_i = P_i ⊕ Enc(Ctr_i), Ctr_{i+1} = Ctr_i + 1 (mod 2^128)
//! ```
//!
//! Each mode exposes a one-shot buffer form and a streaming state machine
//! (`*Encryptor`/`*Decryptor`, or `*Stream` where the transform is its own
//! inverse). The streaming forms carry chain registers, counters, and
//! partial-block state across arbitrarily sized input slices and are
//! byte-for-byte equivalent to the buffer forms.
//!
//! CFB/OFB/CTR run the block cipher forward in both directions; only
//! ECB/CBC decryption uses the inverse transform.

pub mod block;
pub mod cbc;
pub mod cfb;
pub mod ctr;
pub mod ecb;
pub mod keys;
pub mod ofb;
pub mod padding;
pub mod rng;

pub use block::{AesBlock, Block};
pub use keys::{Iv, Key};
pub use rng::{generate_iv, generate_key, is_weak_key, random_bytes};

pub use vf_core::{BLOCK_SIZE, IV_SIZE, KEY_SIZE};

pub(crate) use vf_core::try_alloc;
