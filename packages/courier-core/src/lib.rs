//! # Courier Core
//!
//! The cryptographic core of an end-to-end encrypted messaging client.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        COURIER CORE MODULES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────┐      ┌──────────────┐      ┌──────────────────────┐  │
//! │  │  Messaging   │      │   Custody    │      │      Request         │  │
//! │  │              │      │              │      │                      │  │
//! │  │ - Hybrid     │      │ - Wrap key   │      │ - Canonical form     │  │
//! │  │   encrypt    │      │ - Unwrap key │      │ - Sign envelope      │  │
//! │  │ - Decrypt    │      │ - Rewrap     │      │ - Verify envelope    │  │
//! │  └──┬────┬──────┘      └──┬──────┬────┘      └──────────┬───────────┘  │
//! │     │    │                │      │                      │              │
//! │     │    └───────┬────────┘      │                      │              │
//! │     │            ▼               │                      │              │
//! │     │   ┌──────────────────┐     │                      │              │
//! │     │   │   Compression    │     │                      │              │
//! │     │   │ deflate/zlib/zstd│     │                      │              │
//! │     │   └──────────────────┘     │                      │              │
//! │     ▼                            ▼                      ▼              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                          Crypto                                 │   │
//! │  │  keys (RSA PEM) · asymmetric (OAEP, PKCS#1) · symmetric (GCM)   │   │
//! │  │  kdf (PBKDF2)                                                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types and failure tiers
//! - [`crypto`] - Keys and cryptographic primitives
//! - [`compression`] - Pluggable lossless codecs
//! - [`messaging`] - Hybrid message encryption
//! - [`custody`] - Zero-knowledge private key custody
//! - [`request`] - Signed API request envelopes
//! - [`config`] - TOML configuration
//!
//! ## Security Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SECURITY LAYERS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Layer 1: Message Confidentiality (RSA-OAEP + AES-256-GCM)             │
//! │  ─────────────────────────────────────────────────────────              │
//! │  Each message gets a one-time AES key, wrapped for the recipient's     │
//! │  RSA key. The server relays ciphertext it cannot open.                 │
//! │                                                                         │
//! │  Layer 2: Key Custody (PBKDF2 + AES-256-GCM)                           │
//! │  ───────────────────────────────────────────                            │
//! │  The private key is stored server-side encrypted under the raw         │
//! │  password. The server only ever sees a hash of that password.          │
//! │                                                                         │
//! │  Layer 3: Request Authentication (RSA PKCS#1 v1.5 signatures)          │
//! │  ─────────────────────────────────────────────────────────              │
//! │  Requests carry a signature over userId ∥ auth ∥ body, so a stolen     │
//! │  bearer token alone cannot forge requests.                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Tiers
//!
//! Empty input gives an empty result, a soft cryptographic failure gives
//! `None`, and caller misuse (a public key where a private one is needed)
//! gives an `Err`. See [`error`] for details.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod compression;
pub mod config;
pub mod crypto;
pub mod custody;
pub mod error;
pub mod messaging;
pub mod request;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use compression::{CodecKind, CompressionCodec, SharedCodec};
pub use config::CryptoConfig;
pub use crypto::{EncryptionResult, KeyPair};
pub use custody::{KeyCustody, UserPassword, WrappedKeyPair};
pub use error::{Error, Result};
pub use messaging::MessageCipher;
pub use request::RequestEnvelope;

// ============================================================================
// CORE INSTANCE
// ============================================================================

/// The configured components, sharing one codec
///
/// ## Lifecycle
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                        COURIER CORE LIFECYCLE                           │
/// ├─────────────────────────────────────────────────────────────────────────┤
/// │                                                                         │
/// │  1. Configure                                                          │
/// │     CryptoConfig::load("courier.toml") or CryptoConfig::default()      │
/// │            │                                                           │
/// │            ▼                                                           │
/// │  2. Build                                                              │
/// │     CryptoCore::new(config) ──► validate ──► build codec               │
/// │            │                                                           │
/// │            ▼                                                           │
/// │  3. Use (from any thread; clone freely)                                │
/// │     core.messages()  ─► encrypt_message / decrypt_message              │
/// │     core.custody()   ─► wrap / unwrap private key                      │
/// │     core.generate_keypair()                                            │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone)]
pub struct CryptoCore {
    config: CryptoConfig,
    messages: MessageCipher,
    custody: KeyCustody,
}

impl CryptoCore {
    /// Build the core from a validated configuration
    ///
    /// ## Example
    ///
    /// ```ignore
    /// use courier_core::{CryptoConfig, CryptoCore};
    ///
    /// let core = CryptoCore::new(CryptoConfig::default())?;
    /// ```
    pub fn new(config: CryptoConfig) -> Result<Self> {
        config.validate()?;

        let codec = config.build_codec();
        tracing::info!(
            "Initializing Courier Core v{} (codec: {}, key size: {} bits)",
            version(),
            codec.name(),
            config.rsa_key_bits
        );

        Ok(Self {
            messages: MessageCipher::new(codec.clone()),
            custody: KeyCustody::new(codec),
            config,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    /// Hybrid message encryption
    pub fn messages(&self) -> &MessageCipher {
        &self.messages
    }

    /// Private key custody
    pub fn custody(&self) -> &KeyCustody {
        &self.custody
    }

    /// Generate a keypair with the configured modulus size
    pub fn generate_keypair(&self) -> Result<KeyPair> {
        KeyPair::generate_with_bits(self.config.rsa_key_bits)
    }

    /// [`CryptoCore::generate_keypair`] on the blocking thread pool
    pub async fn generate_keypair_async(&self) -> Result<KeyPair> {
        let bits = self.config.rsa_key_bits;
        tokio::task::spawn_blocking(move || KeyPair::generate_with_bits(bits)).await?
    }
}

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of Courier Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TEST FIXTURES
// ============================================================================


// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::alice;

    fn small_core() -> CryptoCore {
        CryptoCore::new(CryptoConfig {
            rsa_key_bits: 2048,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = CryptoCore::new(CryptoConfig {
            rsa_key_bits: 512,
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_components_share_codec() {
        let core = CryptoCore::new(CryptoConfig {
            compression: CodecKind::Zstd,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(core.messages().codec().name(), "zstd");

        let wrapped = core.custody().wrap_public_key("public").unwrap();
        assert_eq!(core.messages().codec().decompress(&wrapped).unwrap(), "public");
    }

    #[test]
    fn test_end_to_end_flow() {
        let core = small_core();
        let password = UserPassword::new("Tr0ub4dor&3");
        let recipient = alice();

        // Registration: store the wrapped keypair
        let stored = core.custody().wrap_keypair(recipient, &password).unwrap();

        // Someone sends a message to the public key
        let packed = core
            .messages()
            .encrypt_message(r#"{"text":"hello"}"#, recipient.public_key())
            .unwrap();

        // Login on another device, then read it
        let restored = core.custody().unwrap_keypair(&stored, &password).unwrap();
        let text = core
            .messages()
            .decrypt_message(&packed, restored.private_key())
            .unwrap();

        assert_eq!(text.as_deref(), Some(r#"{"text":"hello"}"#));
    }

    #[tokio::test]
    async fn test_generate_keypair_async() {
        let core = small_core();
        let kp = core.generate_keypair_async().await.unwrap();

        assert!(kp.public_key().starts_with("-----BEGIN PUBLIC KEY-----"));
        assert!(crypto::parse_key(kp.private_key()).unwrap().is_private());
    }
}
