//! Chunked cipher pipeline
//!
//! Drives the vf-crypto mode state machines over a `Read`/`Write` pair
//! without ever holding the whole input in memory. The block-aligned modes
//! carry their deferred-final-block state inside the mode engine itself,
//! so the pipeline only moves bytes and counts them.
//!
//! Any failure aborts the whole operation. Already-written output bytes
//! are left in place; a non-success result means the output is
//! untrustworthy.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use vf_core::{try_alloc, Mode, VfError, VfResult, IV_SIZE};
use vf_crypto::cbc::{CbcDecryptor, CbcEncryptor};
use vf_crypto::cfb::{CfbDecryptor, CfbEncryptor};
use vf_crypto::ctr::CtrStream;
use vf_crypto::ecb::{EcbDecryptor, EcbEncryptor};
use vf_crypto::ofb::OfbStream;
use vf_crypto::{cbc, cfb, ctr, ecb, generate_iv, ofb, Iv, Key};

use crate::DEFAULT_CHUNK_SIZE;

/// Progress callback type (bytes_done, bytes_total, message)
pub type ProgressFn = Box<dyn Fn(u64, u64, &str) + Send + Sync>;

/// Streaming options. `total_bytes` only feeds the progress callback; the
/// pipeline itself never needs to know the input size up front.
pub struct StreamOpts<'a> {
    pub chunk_size: usize,
    pub total_bytes: Option<u64>,
    pub progress: Option<&'a ProgressFn>,
}

impl Default for StreamOpts<'_> {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            total_bytes: None,
            progress: None,
        }
    }
}

/// Result of one streaming cipher operation. Byte counts are exact: the
/// written total includes the IV header and any padding.
#[derive(Debug, Clone)]
pub struct CipherSummary {
    pub mode: Mode,
    /// IV actually used (generated or supplied); `None` for ECB.
    pub iv: Option<Iv>,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

enum EncState {
    Ecb(EcbEncryptor),
    Cbc(CbcEncryptor),
    Cfb(CfbEncryptor),
    Ofb(OfbStream),
    Ctr(CtrStream),
}

enum DecState {
    Ecb(EcbDecryptor),
    Cbc(CbcDecryptor),
    Cfb(CfbDecryptor),
    Ofb(OfbStream),
    Ctr(CtrStream),
}

fn report(opts: &StreamOpts<'_>, done: u64, msg: &str) {
    if let Some(progress) = opts.progress {
        progress(done, opts.total_bytes.unwrap_or(0), msg);
    }
}

/// Encrypt a byte stream.
///
/// For IV modes the IV is freshly generated unless one is supplied, and its
/// 16 raw bytes are written before any ciphertext.
pub fn encrypt_stream<R: Read, W: Write>(
    mode: Mode,
    key: &Key,
    iv: Option<Iv>,
    reader: &mut R,
    writer: &mut W,
    opts: &StreamOpts<'_>,
) -> VfResult<CipherSummary> {
    let mut bytes_read: u64 = 0;
    let mut bytes_written: u64 = 0;

    let iv = if mode.requires_iv() {
        let iv = match iv {
            Some(iv) => iv,
            None => generate_iv()?,
        };
        writer.write_all(iv.as_bytes())?;
        bytes_written += IV_SIZE as u64;
        Some(iv)
    } else {
        None
    };

    let mut state = match (mode, iv.as_ref()) {
        (Mode::Ecb, _) => EncState::Ecb(EcbEncryptor::new(key)),
        (Mode::Cbc, Some(iv)) => EncState::Cbc(CbcEncryptor::new(key, iv)),
        (Mode::Cfb, Some(iv)) => EncState::Cfb(CfbEncryptor::new(key, iv)),
        (Mode::Ofb, Some(iv)) => EncState::Ofb(OfbStream::new(key, iv)),
        (Mode::Ctr, Some(iv)) => EncState::Ctr(CtrStream::new(key, iv)),
        // requires_iv() guarantees an IV for every non-ECB mode
        (_, None) => unreachable!("IV mode without IV"),
    };

    let mut buf = try_alloc(opts.chunk_size.max(1))?;
    let mut block_out = Vec::new();

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        bytes_read += n as u64;

        match &mut state {
            EncState::Ecb(enc) => {
                block_out.clear();
                enc.update(&buf[..n], &mut block_out);
                writer.write_all(&block_out)?;
                bytes_written += block_out.len() as u64;
            }
            EncState::Cbc(enc) => {
                block_out.clear();
                enc.update(&buf[..n], &mut block_out);
                writer.write_all(&block_out)?;
                bytes_written += block_out.len() as u64;
            }
            EncState::Cfb(enc) => {
                enc.apply(&mut buf[..n]);
                writer.write_all(&buf[..n])?;
                bytes_written += n as u64;
            }
            EncState::Ofb(stream) => {
                stream.apply(&mut buf[..n]);
                writer.write_all(&buf[..n])?;
                bytes_written += n as u64;
            }
            EncState::Ctr(stream) => {
                stream.apply(&mut buf[..n]);
                writer.write_all(&buf[..n])?;
                bytes_written += n as u64;
            }
        }
        report(opts, bytes_read, "encrypting");
    }

    match state {
        EncState::Ecb(enc) => {
            block_out.clear();
            enc.finish(&mut block_out);
            writer.write_all(&block_out)?;
            bytes_written += block_out.len() as u64;
        }
        EncState::Cbc(enc) => {
            block_out.clear();
            enc.finish(&mut block_out);
            writer.write_all(&block_out)?;
            bytes_written += block_out.len() as u64;
        }
        EncState::Cfb(_) | EncState::Ofb(_) | EncState::Ctr(_) => {}
    }
    writer.flush()?;

    debug!(mode = %mode, bytes_read, bytes_written, "stream encrypt complete");
    Ok(CipherSummary {
        mode,
        iv,
        bytes_read,
        bytes_written,
    })
}

/// Decrypt a byte stream.
///
/// For IV modes the IV is taken from `iv` when supplied, otherwise read
/// back from the first 16 bytes of the source.
pub fn decrypt_stream<R: Read, W: Write>(
    mode: Mode,
    key: &Key,
    iv: Option<Iv>,
    reader: &mut R,
    writer: &mut W,
    opts: &StreamOpts<'_>,
) -> VfResult<CipherSummary> {
    let mut bytes_read: u64 = 0;
    let mut bytes_written: u64 = 0;

    let iv = if mode.requires_iv() {
        match iv {
            Some(iv) => Some(iv),
            None => {
                let header = read_iv_header(reader)?;
                bytes_read += IV_SIZE as u64;
                Some(header)
            }
        }
    } else {
        None
    };

    let mut state = match (mode, iv.as_ref()) {
        (Mode::Ecb, _) => DecState::Ecb(EcbDecryptor::new(key)),
        (Mode::Cbc, Some(iv)) => DecState::Cbc(CbcDecryptor::new(key, iv)),
        (Mode::Cfb, Some(iv)) => DecState::Cfb(CfbDecryptor::new(key, iv)),
        (Mode::Ofb, Some(iv)) => DecState::Ofb(OfbStream::new(key, iv)),
        (Mode::Ctr, Some(iv)) => DecState::Ctr(CtrStream::new(key, iv)),
        (_, None) => unreachable!("IV mode without IV"),
    };

    let mut buf = try_alloc(opts.chunk_size.max(1))?;
    let mut block_out = Vec::new();

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        bytes_read += n as u64;

        match &mut state {
            DecState::Ecb(dec) => {
                block_out.clear();
                dec.update(&buf[..n], &mut block_out);
                writer.write_all(&block_out)?;
                bytes_written += block_out.len() as u64;
            }
            DecState::Cbc(dec) => {
                block_out.clear();
                dec.update(&buf[..n], &mut block_out);
                writer.write_all(&block_out)?;
                bytes_written += block_out.len() as u64;
            }
            DecState::Cfb(dec) => {
                dec.apply(&mut buf[..n]);
                writer.write_all(&buf[..n])?;
                bytes_written += n as u64;
            }
            DecState::Ofb(stream) => {
                stream.apply(&mut buf[..n]);
                writer.write_all(&buf[..n])?;
                bytes_written += n as u64;
            }
            DecState::Ctr(stream) => {
                stream.apply(&mut buf[..n]);
                writer.write_all(&buf[..n])?;
                bytes_written += n as u64;
            }
        }
        report(opts, bytes_read, "decrypting");
    }

    // The true final block is only decrypted here, once end-of-stream has
    // confirmed it final; this is where padding validation can fail.
    match state {
        DecState::Ecb(dec) => {
            block_out.clear();
            dec.finish(&mut block_out)?;
            writer.write_all(&block_out)?;
            bytes_written += block_out.len() as u64;
        }
        DecState::Cbc(dec) => {
            block_out.clear();
            dec.finish(&mut block_out)?;
            writer.write_all(&block_out)?;
            bytes_written += block_out.len() as u64;
        }
        DecState::Cfb(_) | DecState::Ofb(_) | DecState::Ctr(_) => {}
    }
    writer.flush()?;

    debug!(mode = %mode, bytes_read, bytes_written, "stream decrypt complete");
    Ok(CipherSummary {
        mode,
        iv,
        bytes_read,
        bytes_written,
    })
}

/// Read the mandatory 16-byte IV header from a ciphertext source.
fn read_iv_header<R: Read>(reader: &mut R) -> VfResult<Iv> {
    let mut header = [0u8; IV_SIZE];
    let mut got = 0;
    while got < IV_SIZE {
        let n = reader.read(&mut header[got..])?;
        if n == 0 {
            return Err(VfError::InsufficientInput {
                needed: IV_SIZE,
                actual: got,
            });
        }
        got += n;
    }
    Ok(Iv::from_bytes(header))
}

/// Whole-buffer encryption. Produces the exact bytes the streaming form
/// would write: 16-byte IV header (IV modes) followed by mode output.
pub fn encrypt_buffer(
    mode: Mode,
    key: &Key,
    iv: Option<Iv>,
    plaintext: &[u8],
) -> VfResult<(Option<Iv>, Vec<u8>)> {
    let (iv, body) = match mode {
        Mode::Ecb => (None, ecb::encrypt(key, plaintext)?),
        _ => {
            let iv = match iv {
                Some(iv) => iv,
                None => generate_iv()?,
            };
            let body = match mode {
                Mode::Cbc => cbc::encrypt(key, &iv, plaintext)?,
                Mode::Cfb => cfb::encrypt(key, &iv, plaintext)?,
                Mode::Ofb => ofb::encrypt(key, &iv, plaintext)?,
                Mode::Ctr => ctr::encrypt(key, &iv, plaintext)?,
                Mode::Ecb => unreachable!(),
            };
            (Some(iv), body)
        }
    };

    let header_len = iv.map_or(0, |_| IV_SIZE);
    let mut artifact = Vec::new();
    artifact.try_reserve_exact(header_len + body.len())?;
    if let Some(iv) = iv.as_ref() {
        artifact.extend_from_slice(iv.as_bytes());
    }
    artifact.extend_from_slice(&body);
    Ok((iv, artifact))
}

/// Whole-buffer decryption of an artifact produced by `encrypt_buffer` or
/// `encrypt_stream`. When `iv` is supplied the input carries no header.
pub fn decrypt_buffer(
    mode: Mode,
    key: &Key,
    iv: Option<Iv>,
    artifact: &[u8],
) -> VfResult<Vec<u8>> {
    let (iv, body) = if mode.requires_iv() {
        match iv {
            Some(iv) => (Some(iv), artifact),
            None => {
                if artifact.len() < IV_SIZE {
                    return Err(VfError::InsufficientInput {
                        needed: IV_SIZE,
                        actual: artifact.len(),
                    });
                }
                let (header, body) = artifact.split_at(IV_SIZE);
                (Some(Iv::from_slice(header)?), body)
            }
        }
    } else {
        (None, artifact)
    };

    match (mode, iv) {
        (Mode::Ecb, _) => ecb::decrypt(key, body),
        (Mode::Cbc, Some(iv)) => cbc::decrypt(key, &iv, body),
        (Mode::Cfb, Some(iv)) => cfb::decrypt(key, &iv, body),
        (Mode::Ofb, Some(iv)) => ofb::decrypt(key, &iv, body),
        (Mode::Ctr, Some(iv)) => ctr::decrypt(key, &iv, body),
        (_, None) => unreachable!("IV mode without IV"),
    }
}

/// Encrypt a file path to a file path.
pub fn encrypt_file(
    mode: Mode,
    key: &Key,
    input: &Path,
    output: &Path,
    opts: &StreamOpts<'_>,
) -> VfResult<CipherSummary> {
    let mut reader = File::open(input)?;
    let mut writer = File::create(output)?;
    encrypt_stream(mode, key, None, &mut reader, &mut writer, opts)
}

/// Decrypt a file path to a file path. `iv` overrides the artifact header.
pub fn decrypt_file(
    mode: Mode,
    key: &Key,
    iv: Option<Iv>,
    input: &Path,
    output: &Path,
    opts: &StreamOpts<'_>,
) -> VfResult<CipherSummary> {
    let mut reader = File::open(input)?;
    let mut writer = File::create(output)?;
    decrypt_stream(mode, key, iv, &mut reader, &mut writer, opts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    const ALL_MODES: [Mode; 5] = [Mode::Ecb, Mode::Cbc, Mode::Cfb, Mode::Ofb, Mode::Ctr];

    fn test_key() -> Key {
        Key::from_hex("000102030405060708090a0b0c0d0e0f").unwrap()
    }

    fn test_iv() -> Iv {
        Iv::from_bytes([0x24; 16])
    }

    fn stream_encrypt(mode: Mode, data: &[u8], chunk: usize) -> Vec<u8> {
        let key = test_key();
        let iv = mode.requires_iv().then(test_iv);
        let mut out = Vec::new();
        let opts = StreamOpts {
            chunk_size: chunk,
            ..Default::default()
        };
        encrypt_stream(mode, &key, iv, &mut Cursor::new(data), &mut out, &opts).unwrap();
        out
    }

    #[test]
    fn header_layout() {
        for mode in ALL_MODES {
            let artifact = stream_encrypt(mode, b"hello pipeline", 4096);
            if mode.requires_iv() {
                assert_eq!(&artifact[..IV_SIZE], test_iv().as_bytes(), "{mode}");
            } else {
                // no header: padded single block only
                assert_eq!(artifact.len(), 16, "{mode}");
            }
        }
    }

    #[test]
    fn empty_input_artifacts() {
        for mode in ALL_MODES {
            let artifact = stream_encrypt(mode, b"", 4096);
            let expected = match mode {
                // one full padding block, plus header where applicable
                Mode::Ecb => 16,
                Mode::Cbc => 32,
                // header only
                _ => 16,
            };
            assert_eq!(artifact.len(), expected, "{mode}");

            let key = test_key();
            let plain =
                decrypt_buffer(mode, &key, None, &artifact).unwrap();
            assert!(plain.is_empty(), "{mode}");
        }
    }

    #[test]
    fn decrypt_rejects_truncated_header() {
        let key = test_key();
        let mut out = Vec::new();
        let err = decrypt_stream(
            Mode::Cbc,
            &key,
            None,
            &mut Cursor::new(&[0u8; 7]),
            &mut out,
            &StreamOpts::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            VfError::InsufficientInput {
                needed: 16,
                actual: 7
            }
        ));
    }

    #[test]
    fn exact_byte_accounting() {
        let data = vec![0x5au8; 100];
        let key = test_key();
        let mut out = Vec::new();
        let summary = encrypt_stream(
            Mode::Cbc,
            &key,
            Some(test_iv()),
            &mut Cursor::new(&data),
            &mut out,
            &StreamOpts::default(),
        )
        .unwrap();
        assert_eq!(summary.bytes_read, 100);
        // 16 IV + 112 padded ciphertext
        assert_eq!(summary.bytes_written, 128);
        assert_eq!(out.len() as u64, summary.bytes_written);
    }

    proptest! {
        #[test]
        fn stream_matches_buffer_form(
            data in proptest::collection::vec(any::<u8>(), 0..=600),
            chunk in 1usize..=64,
            mode_idx in 0usize..5,
        ) {
            let mode = ALL_MODES[mode_idx];
            let key = test_key();
            let iv = mode.requires_iv().then(test_iv);

            let streamed = stream_encrypt(mode, &data, chunk);
            let (_, buffered) = encrypt_buffer(mode, &key, iv, &data).unwrap();
            prop_assert_eq!(&streamed, &buffered);

            // and the streaming decrypt path round-trips it
            let mut plain = Vec::new();
            let opts = StreamOpts { chunk_size: chunk, ..Default::default() };
            decrypt_stream(mode, &key, None, &mut Cursor::new(&streamed), &mut plain, &opts)
                .unwrap();
            prop_assert_eq!(plain, data);
        }
    }
}
