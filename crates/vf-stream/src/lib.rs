//! vf-stream: bounded-memory drivers for the vaultfile primitives
//!
//! Files of any size are processed in fixed-size chunks (4 MiB by default)
//! with chain registers, counters, and partial-block carry surviving the
//! chunk boundaries. The streaming forms are byte-for-byte identical to
//! whole-buffer processing of the same input under the same IV.
//!
//! Artifact framing: for IV modes the first 16 bytes of the output are the
//! raw IV / initial counter value; everything after is mode output. ECB
//! artifacts have no header.

pub mod cipher;
pub mod digest;

pub use cipher::{
    decrypt_buffer, decrypt_file, decrypt_stream, encrypt_buffer, encrypt_file,
    encrypt_stream, CipherSummary, ProgressFn, StreamOpts,
};
pub use digest::{
    cmac_file, cmac_reader, hash_file, hash_reader, hmac_file, hmac_reader,
};

/// Default streaming chunk size: 4 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;
