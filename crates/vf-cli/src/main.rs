//! vf: vaultfile command-line interface
//!
//! Commands:
//!   encrypt / decrypt       - AES-128 file encryption in ecb/cbc/cfb/ofb/ctr
//!   hash                    - SHA-256 or SHA3-256 file digest
//!   hmac / cmac             - HMAC-SHA256 / AES-CMAC file MACs
//!   keygen                  - generate a random AES-128 key
//!   batch encrypt|decrypt   - per-file encryption across a directory with
//!                             a JSON manifest mapping names

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use vf_core::config::VfConfig;
use vf_core::{HashAlgorithm, Mode};
use vf_crypto::{generate_key, is_weak_key, Iv, Key};
use vf_stream::{decrypt_file, encrypt_file, ProgressFn, StreamOpts};

mod batch;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "vf",
    version,
    about = "vaultfile: AES-128 file encryption toolkit",
    long_about = "vf: encrypt, decrypt, digest, and authenticate files \
                  (AES-128 ecb/cbc/cfb/ofb/ctr, SHA-256, SHA3-256, HMAC, CMAC)"
)]
struct Cli {
    /// Path to vaultfile.toml configuration file
    #[arg(long, short = 'c', env = "VF_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a file
    ///
    /// For cbc/cfb/ofb/ctr a fresh random IV is generated and written as
    /// the first 16 bytes of the output.
    Encrypt {
        /// Cipher mode: ecb, cbc, cfb, ofb, or ctr
        #[arg(long, short = 'm', default_value = "cbc")]
        mode: String,
        /// AES-128 key, 32 hex characters
        #[arg(long, short = 'k', env = "VF_KEY")]
        key: String,
        /// Accepted for symmetry but ignored: encryption always generates
        /// its own IV
        #[arg(long)]
        iv: Option<String>,
        /// Input file
        input: PathBuf,
        /// Output file (default: <input>.enc)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Decrypt a file
    ///
    /// The IV is read from the first 16 bytes of the input unless --iv is
    /// given, in which case the whole input is ciphertext.
    Decrypt {
        /// Cipher mode: ecb, cbc, cfb, ofb, or ctr
        #[arg(long, short = 'm', default_value = "cbc")]
        mode: String,
        /// AES-128 key, 32 hex characters
        #[arg(long, short = 'k', env = "VF_KEY")]
        key: String,
        /// IV, 32 hex characters (input then carries no IV header)
        #[arg(long)]
        iv: Option<String>,
        /// Input file
        input: PathBuf,
        /// Output file (default: <input>.dec)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Compute a file digest
    Hash {
        /// Digest algorithm: sha256 or sha3-256
        #[arg(long, short = 'a', default_value = "sha256")]
        algorithm: String,
        /// Input file
        input: PathBuf,
    },

    /// Compute the HMAC-SHA256 of a file
    Hmac {
        /// MAC key, hex encoded (any length)
        #[arg(long, short = 'k', env = "VF_KEY")]
        key: String,
        /// Input file
        input: PathBuf,
    },

    /// Compute the AES-CMAC of a file
    Cmac {
        /// AES-128 key, 32 hex characters
        #[arg(long, short = 'k', env = "VF_KEY")]
        key: String,
        /// Input file
        input: PathBuf,
    },

    /// Generate a random AES-128 key and print it as hex
    Keygen,

    /// Encrypt or decrypt every regular file in a directory
    Batch {
        #[command(subcommand)]
        action: BatchAction,
    },
}

#[derive(Subcommand, Debug)]
enum BatchAction {
    /// Encrypt all files in a directory and write a JSON manifest
    Encrypt {
        /// Directory to process
        dir: PathBuf,
        /// Cipher mode: ecb, cbc, cfb, ofb, or ctr
        #[arg(long, short = 'm', default_value = "cbc")]
        mode: String,
        /// AES-128 key, 32 hex characters
        #[arg(long, short = 'k', env = "VF_KEY")]
        key: String,
    },
    /// Decrypt a directory using its manifest, restoring original names
    Decrypt {
        /// Directory to process
        dir: PathBuf,
        /// AES-128 key, 32 hex characters
        #[arg(long, short = 'k', env = "VF_KEY")]
        key: String,
    },
}

// ── Setup helpers ──────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<VfConfig> {
    let Some(path) = path else {
        return Ok(VfConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config: {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config: {}", path.display()))
}

fn init_tracing(config: &VfConfig) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log.level.clone()));

    if config.log.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

fn parse_key(hex_key: &str) -> Result<Key> {
    let key = Key::from_hex(hex_key)
        .context("parsing key (expected exactly 32 hex characters for AES-128)")?;
    if is_weak_key(key.as_bytes()) {
        warn!("the supplied key matches a weak pattern (zeros, sequence, or repeat)");
    }
    Ok(key)
}

/// Default output path: append a dot-suffix to the full input name.
fn default_output(input: &Path, suffix: &str) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(format!(".{suffix}"));
    PathBuf::from(name)
}

// ── Progress bar helpers ──────────────────────────────────────────────────────

fn make_progress_bar(total: u64, prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "{prefix:.bold} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}",
        )
        .unwrap()
        .progress_chars("=>-"),
    );
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn file_progress(pb: &ProgressBar) -> ProgressFn {
    let pb = pb.clone();
    Box::new(move |done, total, msg| {
        if total > 0 {
            pb.set_length(total);
        }
        pb.set_position(done);
        pb.set_message(msg.to_string());
    })
}

// ── Cipher commands ────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn cmd_encrypt(
    config: &VfConfig,
    mode: &str,
    key_hex: &str,
    iv: Option<&str>,
    input: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let mode = Mode::from_str(mode)?;
    let key = parse_key(key_hex)?;

    if iv.is_some() {
        warn!("--iv is ignored on encryption; a fresh IV is always generated");
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, &config.io.encrypt_suffix));
    let total = std::fs::metadata(input)
        .with_context(|| format!("reading input metadata: {}", input.display()))?
        .len();

    let pb = make_progress_bar(total, "encrypt");
    let progress = file_progress(&pb);
    let opts = StreamOpts {
        chunk_size: config.io.chunk_size_bytes(),
        total_bytes: Some(total),
        progress: Some(&progress),
    };

    let summary = encrypt_file(mode, &key, input, &output, &opts)
        .with_context(|| format!("encrypting {}", input.display()))?;
    pb.finish_with_message("done");

    if let Some(iv) = summary.iv {
        println!("generated IV: {iv}");
    }
    println!(
        "encrypted {} -> {} ({} mode, {} bytes -> {} bytes)",
        input.display(),
        output.display(),
        mode,
        summary.bytes_read,
        summary.bytes_written,
    );
    Ok(())
}

fn cmd_decrypt(
    config: &VfConfig,
    mode: &str,
    key_hex: &str,
    iv: Option<&str>,
    input: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let mode = Mode::from_str(mode)?;
    let key = parse_key(key_hex)?;
    let iv = iv
        .map(|hex_iv| Iv::from_hex(hex_iv).context("parsing --iv (expected 32 hex characters)"))
        .transpose()?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, &config.io.decrypt_suffix));
    let total = std::fs::metadata(input)
        .with_context(|| format!("reading input metadata: {}", input.display()))?
        .len();

    let pb = make_progress_bar(total, "decrypt");
    let progress = file_progress(&pb);
    let opts = StreamOpts {
        chunk_size: config.io.chunk_size_bytes(),
        total_bytes: Some(total),
        progress: Some(&progress),
    };

    let summary = decrypt_file(mode, &key, iv, input, &output, &opts)
        .with_context(|| format!("decrypting {}", input.display()))?;
    pb.finish_with_message("done");

    if iv.is_none() {
        if let Some(iv) = summary.iv {
            println!("IV read from file: {iv}");
        }
    }
    println!(
        "decrypted {} -> {} ({} mode, {} bytes -> {} bytes)",
        input.display(),
        output.display(),
        mode,
        summary.bytes_read,
        summary.bytes_written,
    );
    Ok(())
}

// ── Digest commands ────────────────────────────────────────────────────────────

fn cmd_hash(algorithm: &str, input: &Path) -> Result<()> {
    let algorithm = HashAlgorithm::from_str(algorithm)?;
    let digest = vf_stream::hash_file(algorithm, input)
        .with_context(|| format!("hashing {}", input.display()))?;
    println!("{}  {}", vf_digest::to_hex(&digest), input.display());
    Ok(())
}

fn cmd_hmac(key_hex: &str, input: &Path) -> Result<()> {
    // HMAC keys may be any length; hex is only the transport encoding
    let key = hex::decode(key_hex).context("parsing --key as hex")?;
    let mac = vf_stream::hmac_file(&key, input)
        .with_context(|| format!("computing HMAC of {}", input.display()))?;
    println!("{}  {}", vf_digest::to_hex(&mac), input.display());
    Ok(())
}

fn cmd_cmac(key_hex: &str, input: &Path) -> Result<()> {
    let key = parse_key(key_hex)?;
    let mac = vf_stream::cmac_file(&key, input)
        .with_context(|| format!("computing CMAC of {}", input.display()))?;
    println!("{}  {}", vf_digest::to_hex(&mac), input.display());
    Ok(())
}

fn cmd_keygen() -> Result<()> {
    let key = generate_key().context("generating key")?;
    println!("{}", hex::encode(key.as_bytes()));
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config);

    match &cli.command {
        Commands::Encrypt {
            mode,
            key,
            iv,
            input,
            output,
        } => cmd_encrypt(
            &config,
            mode,
            key,
            iv.as_deref(),
            input,
            output.as_deref(),
        ),
        Commands::Decrypt {
            mode,
            key,
            iv,
            input,
            output,
        } => cmd_decrypt(
            &config,
            mode,
            key,
            iv.as_deref(),
            input,
            output.as_deref(),
        ),
        Commands::Hash { algorithm, input } => cmd_hash(algorithm, input),
        Commands::Hmac { key, input } => cmd_hmac(key, input),
        Commands::Cmac { key, input } => cmd_cmac(key, input),
        Commands::Keygen => cmd_keygen(),
        Commands::Batch { action } => match action {
            BatchAction::Encrypt { dir, mode, key } => {
                let mode = Mode::from_str(mode)?;
                let key = parse_key(key)?;
                batch::batch_encrypt(&config, dir, mode, &key)
            }
            BatchAction::Decrypt { dir, key } => {
                let key = parse_key(key)?;
                batch::batch_decrypt(&config, dir, &key)
            }
        },
    }
}
