//! Zstandard codec.

use std::io::{Read, Write};

use super::CompressionCodec;
use crate::error::{Error, Result};

const MIN_LEVEL: i32 = 1;
const MAX_LEVEL: i32 = 22;

/// Zstandard frames (RFC 8878)
#[derive(Debug, Clone)]
pub struct ZstdCodec {
    level: i32,
    max_decompressed_size: usize,
}

impl ZstdCodec {
    /// Create a codec; `level` is clamped to `1..=22`
    pub fn new(level: u8, max_decompressed_size: usize) -> Self {
        Self {
            level: i32::from(level).clamp(MIN_LEVEL, MAX_LEVEL),
            max_decompressed_size,
        }
    }
}

impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = zstd::Encoder::new(Vec::new(), self.level)
            .map_err(|e| Error::CompressionFailed(format!("zstd encoder: {}", e)))?;
        encoder
            .write_all(data)
            .map_err(|e| Error::CompressionFailed(format!("zstd write: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| Error::CompressionFailed(format!("zstd finish: {}", e)))
    }

    fn decompress_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let decoder = zstd::Decoder::new(data)
            .map_err(|e| Error::DecompressionFailed(format!("zstd decoder: {}", e)))?;

        // Read one byte past the limit so an oversized frame is detectable
        let mut limited = decoder.take(self.max_decompressed_size as u64 + 1);
        let mut output = Vec::new();
        limited
            .read_to_end(&mut output)
            .map_err(|e| Error::DecompressionFailed(format!("zstd: {}", e)))?;

        if output.len() > self.max_decompressed_size {
            return Err(Error::DecompressedTooLarge {
                limit: self.max_decompressed_size,
            });
        }

        Ok(output)
    }
}
