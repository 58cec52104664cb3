//! Directory batch operations
//!
//! `batch encrypt` walks the top level of a directory, encrypts each
//! regular file with the same per-file primitives as the single-file
//! command, and writes a JSON manifest recording original name, artifact
//! name, and mode. `batch decrypt` replays the manifest to restore the
//! original names.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use vf_core::config::VfConfig;
use vf_core::Mode;
use vf_crypto::Key;
use vf_stream::{decrypt_file, encrypt_file, StreamOpts};

const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchManifest {
    pub version: u32,
    pub mode: Mode,
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Original file name (relative to the batch directory)
    pub original: String,
    /// Encrypted artifact name
    pub artifact: String,
    /// Plaintext size in bytes
    pub bytes: u64,
}

/// Collect the regular files at the top level of `dir`, skipping the
/// manifest itself and (optionally) already-encrypted artifacts.
fn collect_files(config: &VfConfig, dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name == config.batch.manifest_name {
            continue;
        }
        if config.batch.skip_encrypted
            && name.ends_with(&format!(".{}", config.io.encrypt_suffix))
        {
            info!(file = %name, "skipping already-encrypted artifact");
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

pub fn batch_encrypt(config: &VfConfig, dir: &Path, mode: Mode, key: &Key) -> Result<()> {
    let names = collect_files(config, dir)?;
    if names.is_empty() {
        bail!("no files to encrypt in {}", dir.display());
    }

    let opts = StreamOpts {
        chunk_size: config.io.chunk_size_bytes(),
        ..Default::default()
    };

    let mut entries = Vec::with_capacity(names.len());
    let mut total_bytes: u64 = 0;

    for name in names {
        let artifact = format!("{name}.{}", config.io.encrypt_suffix);
        let input = dir.join(&name);
        let output = dir.join(&artifact);

        let summary = encrypt_file(mode, key, &input, &output, &opts)
            .with_context(|| format!("encrypting {}", input.display()))?;
        info!(file = %name, bytes = summary.bytes_read, "encrypted");
        total_bytes += summary.bytes_read;

        entries.push(ManifestEntry {
            original: name,
            artifact,
            bytes: summary.bytes_read,
        });
    }

    let manifest = BatchManifest {
        version: MANIFEST_VERSION,
        mode,
        entries,
    };
    let manifest_path = dir.join(&config.batch.manifest_name);
    let json = serde_json::to_string_pretty(&manifest).context("serializing manifest")?;
    fs::write(&manifest_path, json)
        .with_context(|| format!("writing manifest: {}", manifest_path.display()))?;

    println!(
        "batch encrypt complete: {} files, {} bytes, manifest {}",
        manifest.entries.len(),
        total_bytes,
        manifest_path.display(),
    );
    Ok(())
}

pub fn batch_decrypt(config: &VfConfig, dir: &Path, key: &Key) -> Result<()> {
    let manifest_path = dir.join(&config.batch.manifest_name);
    let raw = fs::read_to_string(&manifest_path)
        .with_context(|| format!("reading manifest: {}", manifest_path.display()))?;
    let manifest: BatchManifest =
        serde_json::from_str(&raw).context("parsing batch manifest")?;
    if manifest.version != MANIFEST_VERSION {
        bail!("unsupported manifest version {}", manifest.version);
    }

    let opts = StreamOpts {
        chunk_size: config.io.chunk_size_bytes(),
        ..Default::default()
    };

    let mut restored = 0usize;
    let mut missing = 0usize;

    for entry in &manifest.entries {
        let artifact = dir.join(&entry.artifact);
        if !artifact.is_file() {
            warn!(artifact = %entry.artifact, "artifact missing, skipping");
            missing += 1;
            continue;
        }
        let output = dir.join(&entry.original);
        decrypt_file(manifest.mode, key, None, &artifact, &output, &opts)
            .with_context(|| format!("decrypting {}", artifact.display()))?;
        info!(file = %entry.original, "restored");
        restored += 1;
    }

    println!(
        "batch decrypt complete: {} files restored, {} missing ({} mode)",
        restored, missing, manifest.mode,
    );
    Ok(())
}
