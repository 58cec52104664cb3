//! Streaming digest and MAC drivers
//!
//! Thin read loops over the vf-digest state machines, for sources too
//! large to slurp. 64 KiB read buffer; the primitives accept any slicing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use vf_core::{HashAlgorithm, VfResult};
use vf_crypto::Key;
use vf_digest::{AesCmac, HmacSha256, Sha256, Sha3_256};

const READ_BUF_LEN: usize = 64 * 1024;

enum Hasher {
    Sha256(Sha256),
    Sha3(Sha3_256),
}

impl Hasher {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
            HashAlgorithm::Sha3_256 => Hasher::Sha3(Sha3_256::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Hasher::Sha256(ctx) => ctx.update(data),
            Hasher::Sha3(ctx) => ctx.update(data),
        }
    }

    fn finalize(self) -> [u8; 32] {
        match self {
            Hasher::Sha256(ctx) => ctx.finalize(),
            Hasher::Sha3(ctx) => ctx.finalize(),
        }
    }
}

/// Hash a byte stream with the selected algorithm.
pub fn hash_reader<R: Read>(algorithm: HashAlgorithm, reader: &mut R) -> VfResult<[u8; 32]> {
    let mut ctx = Hasher::new(algorithm);
    let mut buf = vec![0u8; READ_BUF_LEN];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        ctx.update(&buf[..n]);
    }
    Ok(ctx.finalize())
}

/// Hash a file with the selected algorithm.
pub fn hash_file(algorithm: HashAlgorithm, path: &Path) -> VfResult<[u8; 32]> {
    let mut file = File::open(path)?;
    hash_reader(algorithm, &mut file)
}

/// HMAC-SHA256 over a byte stream. The key may be any length.
pub fn hmac_reader<R: Read>(key: &[u8], reader: &mut R) -> VfResult<[u8; 32]> {
    let mut ctx = HmacSha256::new(key);
    let mut buf = vec![0u8; READ_BUF_LEN];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        ctx.update(&buf[..n]);
    }
    Ok(ctx.finalize())
}

/// HMAC-SHA256 over a file.
pub fn hmac_file(key: &[u8], path: &Path) -> VfResult<[u8; 32]> {
    let mut file = File::open(path)?;
    hmac_reader(key, &mut file)
}

/// AES-CMAC over a byte stream.
pub fn cmac_reader<R: Read>(key: &Key, reader: &mut R) -> VfResult<[u8; 16]> {
    let mut ctx = AesCmac::new(key);
    let mut buf = vec![0u8; READ_BUF_LEN];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        ctx.update(&buf[..n]);
    }
    Ok(ctx.finalize())
}

/// AES-CMAC over a file.
pub fn cmac_file(key: &Key, path: &Path) -> VfResult<[u8; 16]> {
    let mut file = File::open(path)?;
    cmac_reader(key, &mut file)
}
