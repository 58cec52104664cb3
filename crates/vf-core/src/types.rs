use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VfError;

/// AES-128 block cipher mode of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Ecb,
    Cbc,
    Cfb,
    Ofb,
    Ctr,
}

impl Mode {
    /// ECB is the only mode that chains no IV into the first block.
    pub fn requires_iv(self) -> bool {
        !matches!(self, Mode::Ecb)
    }

    /// Block-aligned modes pad with PKCS#7; the stream-like modes (CFB,
    /// OFB, CTR) preserve the plaintext length exactly.
    pub fn requires_padding(self) -> bool {
        matches!(self, Mode::Ecb | Mode::Cbc)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Ecb => "ecb",
            Mode::Cbc => "cbc",
            Mode::Cfb => "cfb",
            Mode::Ofb => "ofb",
            Mode::Ctr => "ctr",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = VfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ecb" => Ok(Mode::Ecb),
            "cbc" => Ok(Mode::Cbc),
            "cfb" => Ok(Mode::Cfb),
            "ofb" => Ok(Mode::Ofb),
            "ctr" => Ok(Mode::Ctr),
            other => Err(VfError::Unsupported(other.to_string())),
        }
    }
}

/// Digest algorithm selector for the `hash` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "sha256")]
    Sha256,
    #[serde(rename = "sha3-256")]
    Sha3_256,
}

impl HashAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha3_256 => "sha3-256",
        }
    }

    /// Output length in bytes (32 for both supported algorithms).
    pub fn digest_len(self) -> usize {
        32
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = VfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "sha3-256" | "sha3_256" => Ok(HashAlgorithm::Sha3_256),
            other => Err(VfError::Unsupported(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parse_roundtrip() {
        for mode in [Mode::Ecb, Mode::Cbc, Mode::Cfb, Mode::Ofb, Mode::Ctr] {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn mode_parse_rejects_unknown() {
        assert!(matches!(
            "gcm".parse::<Mode>(),
            Err(VfError::Unsupported(_))
        ));
    }

    #[test]
    fn mode_parse_is_case_insensitive() {
        assert_eq!("CBC".parse::<Mode>().unwrap(), Mode::Cbc);
    }

    #[test]
    fn iv_and_padding_requirements() {
        assert!(!Mode::Ecb.requires_iv());
        assert!(Mode::Ctr.requires_iv());
        assert!(Mode::Cbc.requires_padding());
        assert!(!Mode::Ofb.requires_padding());
    }

    #[test]
    fn hash_algorithm_parse() {
        assert_eq!(
            "sha256".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha256
        );
        assert_eq!(
            "sha3-256".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha3_256
        );
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }
}
