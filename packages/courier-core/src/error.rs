//! # Error Handling
//!
//! Error types for Courier Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Configuration Errors                                              │
//! │  │   ├── InvalidConfig         - Out-of-range or unparsable setting    │
//! │  │   └── UnknownCodec          - Codec name not recognised             │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   ├── EncryptionFailed      - Encryption operation failed           │
//! │  │   ├── DecryptionFailed      - Decryption operation failed           │
//! │  │   ├── InvalidKey            - Key text could not be parsed          │
//! │  │   ├── PrivateKeyRequired    - Public key given where private needed │
//! │  │   └── KeyGenerationFailed   - RSA key generation failed             │
//! │  │                                                                      │
//! │  ├── Codec Errors                                                      │
//! │  │   ├── CompressionFailed     - Codec could not compress              │
//! │  │   ├── DecompressionFailed   - Corrupt or foreign compressed data    │
//! │  │   └── DecompressedTooLarge  - Output exceeds configured limit       │
//! │  │                                                                      │
//! │  ├── Message Errors                                                    │
//! │  │   ├── MalformedMessage      - Packed message has wrong shape        │
//! │  │   └── InvalidEncoding       - Bad base64 or UTF-8                   │
//! │  │                                                                      │
//! │  └── Internal Errors                                                   │
//! │      ├── SerializationError / DeserializationError                     │
//! │      └── TaskFailed            - Blocking worker panicked or vanished  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Tiers
//!
//! Operations in this crate distinguish three outcomes:
//!
//! | Tier | Cause | Surface |
//! |------|-------|---------|
//! | Empty input | Nothing to process | `Some(empty)` / `Ok(empty)` |
//! | Soft failure | Wrong key, wrong password, tampering | `None` + log event |
//! | Structural failure | Caller misuse (e.g. public key to decrypt) | `Err(_)` |
//!
//! Only structural failures are meant to propagate; [`Error::is_structural`]
//! identifies them. Error messages never contain key material, passwords or
//! plaintext.

use thiserror::Error;

/// Result type alias for Courier Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Courier Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors (100-199)
    // ========================================================================

    /// A configuration value is missing, malformed or out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configured compression codec is not known
    #[error("Unknown compression codec: {0}")]
    UnknownCodec(String),

    // ========================================================================
    // Crypto Errors (300-399)
    // ========================================================================

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Invalid key format or length
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// A public key was supplied to an operation that needs the private half
    #[error("A private key is required for {0}, but only a public key was supplied")]
    PrivateKeyRequired(&'static str),

    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    // ========================================================================
    // Codec Errors (400-499)
    // ========================================================================

    /// Compression failed
    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    /// Decompression failed
    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    /// Decompressed output would exceed the configured limit
    #[error("Decompressed data exceeds the limit of {limit} bytes")]
    DecompressedTooLarge {
        /// Configured maximum in bytes
        limit: usize,
    },

    // ========================================================================
    // Message Errors (700-799)
    // ========================================================================

    /// Packed message does not have the expected shape
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// Base64 or UTF-8 decoding failed
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// A blocking worker task did not complete
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl Error {
    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 100-199: Configuration
    /// - 300-399: Crypto
    /// - 400-499: Codec
    /// - 700-799: Messages
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            // Configuration (100-199)
            Error::InvalidConfig(_) => 100,
            Error::UnknownCodec(_) => 101,

            // Crypto (300-399)
            Error::EncryptionFailed(_) => 300,
            Error::DecryptionFailed(_) => 301,
            Error::InvalidKey(_) => 304,
            Error::PrivateKeyRequired(_) => 307,
            Error::KeyGenerationFailed(_) => 308,

            // Codec (400-499)
            Error::CompressionFailed(_) => 400,
            Error::DecompressionFailed(_) => 401,
            Error::DecompressedTooLarge { .. } => 402,

            // Messages (700-799)
            Error::MalformedMessage(_) => 700,
            Error::InvalidEncoding(_) => 701,

            // Internal (900-999)
            Error::SerializationError(_) => 902,
            Error::DeserializationError(_) => 903,
            Error::TaskFailed(_) => 904,
        }
    }

    /// Check if this error signals caller misuse
    ///
    /// Structural errors can never succeed on retry with the same arguments
    /// and should be propagated rather than treated as "operation failed".
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::PrivateKeyRequired(_) | Error::InvalidConfig(_) | Error::UnknownCodec(_)
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::InvalidEncoding(format!("base64: {}", err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::InvalidEncoding(format!("utf-8: {}", err))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::TaskFailed(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
