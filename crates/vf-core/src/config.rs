use serde::{Deserialize, Serialize};

/// Top-level tool configuration (loaded from vaultfile.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VfConfig {
    pub io: IoConfig,
    pub log: LogConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IoConfig {
    /// Streaming chunk size in MiB (default: 4)
    pub chunk_size_mib: usize,
    /// Suffix appended to encrypted artifacts (default: "enc")
    pub encrypt_suffix: String,
    /// Suffix appended to decrypted outputs (default: "dec")
    pub decrypt_suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Manifest file name written into a batch-encrypted directory
    pub manifest_name: String,
    /// Skip files that already carry the encrypt suffix
    pub skip_encrypted: bool,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            chunk_size_mib: 4,
            encrypt_suffix: "enc".into(),
            decrypt_suffix: "dec".into(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            manifest_name: ".vaultfile-manifest.json".into(),
            skip_encrypted: true,
        }
    }
}

impl IoConfig {
    /// Chunk size in bytes, never zero.
    pub fn chunk_size_bytes(&self) -> usize {
        self.chunk_size_mib.max(1) * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[io]
chunk_size_mib = 8
encrypt_suffix = "sealed"
decrypt_suffix = "plain"

[log]
level = "debug"
format = "json"

[batch]
manifest_name = "manifest.json"
skip_encrypted = false
"#;
        let config: VfConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.io.chunk_size_mib, 8);
        assert_eq!(config.io.encrypt_suffix, "sealed");
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, "json");
        assert_eq!(config.batch.manifest_name, "manifest.json");
        assert!(!config.batch.skip_encrypted);
    }

    #[test]
    fn test_parse_defaults() {
        let config: VfConfig = toml::from_str("").unwrap();

        assert_eq!(config.io.chunk_size_mib, 4);
        assert_eq!(config.io.chunk_size_bytes(), 4 * 1024 * 1024);
        assert_eq!(config.io.encrypt_suffix, "enc");
        assert_eq!(config.log.level, "info");
        assert_eq!(config.batch.manifest_name, ".vaultfile-manifest.json");
        assert!(config.batch.skip_encrypted);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[io]
chunk_size_mib = 16
"#;
        let config: VfConfig = toml::from_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.io.chunk_size_mib, 16);
        // Defaults
        assert_eq!(config.io.encrypt_suffix, "enc");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = VfConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: VfConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.io.chunk_size_mib, parsed.io.chunk_size_mib);
        assert_eq!(config.log.level, parsed.log.level);
        assert_eq!(config.batch.manifest_name, parsed.batch.manifest_name);
    }

    #[test]
    fn test_zero_chunk_size_clamped() {
        let config: VfConfig = toml::from_str("[io]\nchunk_size_mib = 0\n").unwrap();
        assert_eq!(config.io.chunk_size_bytes(), 1024 * 1024);
    }
}
