//! # Compression
//!
//! Lossless codecs that shrink transport payloads around the crypto layer.
//!
//! ## Codec Selection
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         COMPRESSION CODECS                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  CryptoConfig.compression ──► CodecKind ──► Arc<dyn CompressionCodec>   │
//! │                                                                         │
//! │  ┌──────────┬──────────────────────────────┬──────────────────────┐    │
//! │  │ Kind     │ Format                       │ Corruption detected  │    │
//! │  ├──────────┼──────────────────────────────┼──────────────────────┤    │
//! │  │ deflate  │ raw DEFLATE (RFC 1951)       │ only if malformed    │    │
//! │  │ zlib     │ DEFLATE + header + Adler-32  │ yes (default)        │    │
//! │  │ zstd     │ Zstandard frame              │ yes                  │    │
//! │  └──────────┴──────────────────────────────┴──────────────────────┘    │
//! │                                                                         │
//! │  Every codec refuses to produce more than max_decompressed_size bytes. │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Text Form
//!
//! The crypto layer exchanges text, so [`CompressionCodec::compress`] returns
//! the compressed bytes as standard base64 and [`CompressionCodec::decompress`]
//! reverses it. Empty text maps to empty text in both directions.

mod deflate;
mod zstandard;

pub use deflate::{DeflateCodec, ZlibCodec};
pub use zstandard::ZstdCodec;

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default upper bound on decompressed output (16 MiB)
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 16 * 1024 * 1024;

/// Default compression level
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

/// A codec shared between components
pub type SharedCodec = Arc<dyn CompressionCodec>;

/// Uniform lossless compress / decompress contract
pub trait CompressionCodec: Send + Sync + fmt::Debug {
    /// Short codec name, as used in configuration
    fn name(&self) -> &'static str;

    /// Compress raw bytes
    fn compress_bytes(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress raw bytes
    ///
    /// Fails with `DecompressedTooLarge` if the output would exceed the
    /// codec's limit and `DecompressionFailed` for corrupt input.
    fn decompress_bytes(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Compress UTF-8 text into base64 text
    fn compress(&self, text: &str) -> Result<String> {
        if text.is_empty() {
            return Ok(String::new());
        }
        let compressed = self.compress_bytes(text.as_bytes())?;
        Ok(BASE64.encode(compressed))
    }

    /// Decompress base64 text produced by [`CompressionCodec::compress`]
    fn decompress(&self, encoded: &str) -> Result<String> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Ok(String::new());
        }
        let compressed = BASE64.decode(encoded)?;
        let raw = self.decompress_bytes(&compressed)?;
        Ok(String::from_utf8(raw)?)
    }
}

/// Available codec implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    /// Raw DEFLATE stream
    Deflate,
    /// zlib-wrapped DEFLATE with Adler-32 checksum
    #[default]
    Zlib,
    /// Zstandard
    Zstd,
}

impl CodecKind {
    /// Configuration name of this codec
    pub fn as_str(&self) -> &'static str {
        match self {
            CodecKind::Deflate => "deflate",
            CodecKind::Zlib => "zlib",
            CodecKind::Zstd => "zstd",
        }
    }

    /// Build a codec of this kind
    pub fn build(self, level: u8, max_decompressed_size: usize) -> SharedCodec {
        match self {
            CodecKind::Deflate => Arc::new(DeflateCodec::new(level, max_decompressed_size)),
            CodecKind::Zlib => Arc::new(ZlibCodec::new(level, max_decompressed_size)),
            CodecKind::Zstd => Arc::new(ZstdCodec::new(level, max_decompressed_size)),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CodecKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deflate" => Ok(CodecKind::Deflate),
            "zlib" => Ok(CodecKind::Zlib),
            "zstd" => Ok(CodecKind::Zstd),
            other => Err(Error::UnknownCodec(other.to_string())),
        }
    }
}

/// The default codec (zlib, level 6, 16 MiB limit)
pub fn default_codec() -> SharedCodec {
    CodecKind::default().build(DEFAULT_COMPRESSION_LEVEL, DEFAULT_MAX_DECOMPRESSED_SIZE)
}

// ============================================================================
// ASYNC HELPERS
// ============================================================================

/// Compress text on the blocking thread pool
pub async fn compress_async(codec: SharedCodec, text: String) -> Result<String> {
    tokio::task::spawn_blocking(move || codec.compress(&text)).await?
}

/// Decompress text on the blocking thread pool
pub async fn decompress_async(codec: SharedCodec, encoded: String) -> Result<String> {
    tokio::task::spawn_blocking(move || codec.decompress(&encoded)).await?
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CodecKind; 3] = [CodecKind::Deflate, CodecKind::Zlib, CodecKind::Zstd];

    #[test]
    fn test_text_round_trip_all_codecs() {
        let text = "{\"text\":\"hello\"} ".repeat(50);

        for kind in ALL {
            let codec = kind.build(DEFAULT_COMPRESSION_LEVEL, DEFAULT_MAX_DECOMPRESSED_SIZE);
            let packed = codec.compress(&text).unwrap();

            assert!(packed.len() < text.len(), "{} did not compress", kind);
            assert_eq!(codec.decompress(&packed).unwrap(), text);
        }
    }

    #[test]
    fn test_empty_text() {
        let codec = default_codec();

        assert_eq!(codec.compress("").unwrap(), "");
        assert_eq!(codec.decompress("").unwrap(), "");
        assert_eq!(codec.decompress("  \n").unwrap(), "");
    }

    #[test]
    fn test_decompress_rejects_bad_base64() {
        let err = default_codec().decompress("%%% not base64").unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding(_)));
    }

    #[test]
    fn test_decompress_rejects_foreign_data() {
        let garbage = BASE64.encode(b"definitely not compressed");

        for kind in [CodecKind::Zlib, CodecKind::Zstd] {
            let codec = kind.build(DEFAULT_COMPRESSION_LEVEL, DEFAULT_MAX_DECOMPRESSED_SIZE);
            assert!(codec.decompress(&garbage).is_err(), "{} accepted garbage", kind);
        }
    }

    #[test]
    fn test_codec_kind_parsing() {
        assert_eq!("zlib".parse::<CodecKind>().unwrap(), CodecKind::Zlib);
        assert_eq!(" ZSTD ".parse::<CodecKind>().unwrap(), CodecKind::Zstd);
        assert_eq!("deflate".parse::<CodecKind>().unwrap(), CodecKind::Deflate);
        assert!(matches!(
            "brotli".parse::<CodecKind>(),
            Err(Error::UnknownCodec(_))
        ));
    }

    #[test]
    fn test_codec_kind_names() {
        for kind in ALL {
            let codec = kind.build(1, 1024);
            assert_eq!(codec.name(), kind.as_str());
            assert_eq!(kind.to_string().parse::<CodecKind>().unwrap(), kind);
        }
        assert_eq!(CodecKind::default(), CodecKind::Zlib);
    }

    #[tokio::test]
    async fn test_async_helpers() {
        let codec = default_codec();
        let text = "async payload".repeat(10);

        let packed = compress_async(codec.clone(), text.clone()).await.unwrap();
        assert_eq!(codec.decompress(&packed).unwrap(), text);

        let unpacked = decompress_async(codec, packed).await.unwrap();
        assert_eq!(unpacked, text);
    }
}
