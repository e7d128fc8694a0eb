//! DEFLATE and zlib codecs backed by `miniz_oxide`.

use miniz_oxide::deflate::{compress_to_vec, compress_to_vec_zlib};
use miniz_oxide::inflate::{
    decompress_to_vec_with_limit, decompress_to_vec_zlib_with_limit, DecompressError, TINFLStatus,
};

use super::CompressionCodec;
use crate::error::{Error, Result};

/// Highest level miniz accepts (10 is its non-standard "uber" mode)
const MAX_LEVEL: u8 = 9;

/// Raw DEFLATE (RFC 1951), no header and no checksum
#[derive(Debug, Clone)]
pub struct DeflateCodec {
    level: u8,
    max_decompressed_size: usize,
}

impl DeflateCodec {
    /// Create a codec; `level` is clamped to `0..=9`
    pub fn new(level: u8, max_decompressed_size: usize) -> Self {
        Self {
            level: level.min(MAX_LEVEL),
            max_decompressed_size,
        }
    }
}

impl CompressionCodec for DeflateCodec {
    fn name(&self) -> &'static str {
        "deflate"
    }

    fn compress_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(compress_to_vec(data, self.level))
    }

    fn decompress_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        decompress_to_vec_with_limit(data, self.max_decompressed_size)
            .map_err(|e| map_inflate_error(e, self.max_decompressed_size))
    }
}

/// zlib (RFC 1950): DEFLATE with a header and Adler-32 trailer
#[derive(Debug, Clone)]
pub struct ZlibCodec {
    level: u8,
    max_decompressed_size: usize,
}

impl ZlibCodec {
    /// Create a codec; `level` is clamped to `0..=9`
    pub fn new(level: u8, max_decompressed_size: usize) -> Self {
        Self {
            level: level.min(MAX_LEVEL),
            max_decompressed_size,
        }
    }
}

impl CompressionCodec for ZlibCodec {
    fn name(&self) -> &'static str {
        "zlib"
    }

    fn compress_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(compress_to_vec_zlib(data, self.level))
    }

    fn decompress_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        decompress_to_vec_zlib_with_limit(data, self.max_decompressed_size)
            .map_err(|e| map_inflate_error(e, self.max_decompressed_size))
    }
}

fn map_inflate_error(err: DecompressError, limit: usize) -> Error {
    match err.status {
        TINFLStatus::HasMoreOutput => Error::DecompressedTooLarge { limit },
        status => Error::DecompressionFailed(format!("inflate: {:?}", status)),
    }
}
