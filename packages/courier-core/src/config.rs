//! # Configuration
//!
//! Tunables for the crypto core, loadable from TOML.
//!
//! ```toml
//! # courier.toml
//! compression = "zlib"            # deflate | zlib | zstd
//! compression_level = 6
//! max_decompressed_size = 16777216
//! rsa_key_bits = 4096
//! ```
//!
//! Every field is optional; missing fields take the defaults above.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compression::{
    CodecKind, SharedCodec, DEFAULT_COMPRESSION_LEVEL, DEFAULT_MAX_DECOMPRESSED_SIZE,
};
use crate::crypto::keys::{DEFAULT_KEY_BITS, MAX_KEY_BITS, MIN_KEY_BITS};
use crate::error::{Error, Result};

/// Smallest decompression limit accepted (a 4096-bit wrapped key fits easily)
pub const MIN_DECOMPRESSED_SIZE: usize = 4 * 1024;

/// Configuration for [`crate::CryptoCore`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// Codec used for messages and wrapped keys
    #[serde(default)]
    pub compression: CodecKind,
    /// Codec level (clamped to the codec's own range)
    #[serde(default = "default_compression_level")]
    pub compression_level: u8,
    /// Upper bound on decompressed output in bytes
    #[serde(default = "default_max_decompressed_size")]
    pub max_decompressed_size: usize,
    /// Modulus size for newly generated keypairs
    #[serde(default = "default_rsa_key_bits")]
    pub rsa_key_bits: usize,
}

fn default_compression_level() -> u8 {
    DEFAULT_COMPRESSION_LEVEL
}

fn default_max_decompressed_size() -> usize {
    DEFAULT_MAX_DECOMPRESSED_SIZE
}

fn default_rsa_key_bits() -> usize {
    DEFAULT_KEY_BITS
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            compression: CodecKind::default(),
            compression_level: default_compression_level(),
            max_decompressed_size: default_max_decompressed_size(),
            rsa_key_bits: default_rsa_key_bits(),
        }
    }
}

impl CryptoConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config = Self::from_toml_str(&contents)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Render as pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject out-of-range values
    pub fn validate(&self) -> Result<()> {
        if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&self.rsa_key_bits) {
            return Err(Error::InvalidConfig(format!(
                "rsa_key_bits must be between {} and {}, got {}",
                MIN_KEY_BITS, MAX_KEY_BITS, self.rsa_key_bits
            )));
        }

        if self.rsa_key_bits % 8 != 0 {
            return Err(Error::InvalidConfig(format!(
                "rsa_key_bits must be a multiple of 8, got {}",
                self.rsa_key_bits
            )));
        }

        if self.max_decompressed_size < MIN_DECOMPRESSED_SIZE {
            return Err(Error::InvalidConfig(format!(
                "max_decompressed_size must be at least {} bytes, got {}",
                MIN_DECOMPRESSED_SIZE, self.max_decompressed_size
            )));
        }

        Ok(())
    }

    /// Build the configured codec
    pub fn build_codec(&self) -> SharedCodec {
        self.compression
            .build(self.compression_level, self.max_decompressed_size)
    }
}
