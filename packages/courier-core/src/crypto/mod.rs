//! # Cryptography Module
//!
//! The primitives every higher layer of Courier Core is built from.
//!
//! ## Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC PRIMITIVES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    KEYS (keys)                                  │   │
//! │  ├─────────────────────────────────────────────────────────────────┤   │
//! │  │                                                                 │   │
//! │  │  RSA keypair (4096-bit by default), exchanged as PEM text      │   │
//! │  │  • Public:  SPKI   "BEGIN PUBLIC KEY"                          │   │
//! │  │  • Private: PKCS#8 "BEGIN PRIVATE KEY" (zeroized on drop)      │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌───────────────────────────────┐   ┌─────────────────────────────┐   │
//! │  │   ASYMMETRIC (asymmetric)     │   │   SYMMETRIC (symmetric)     │   │
//! │  ├───────────────────────────────┤   ├─────────────────────────────┤   │
//! │  │                               │   │                             │   │
//! │  │  RSA-OAEP-SHA256              │   │  AES-256-GCM                │   │
//! │  │   • wraps the per-message key │   │   • random key per message │   │
//! │  │                               │   │   • or password-derived key│   │
//! │  │  RSASSA-PKCS1-v1_5 / SHA-256  │   │                             │   │
//! │  │   • request signatures        │   │  PBKDF2-HMAC-SHA256 (kdf)   │   │
//! │  │                               │   │   • 32B salt, 16384 rounds │   │
//! │  └───────────────────────────────┘   └─────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm Choices
//!
//! | Algorithm | Purpose | Why Chosen |
//! |-----------|---------|------------|
//! | RSA-4096 | Identity keys | Interoperable PEM keys shared with other clients |
//! | RSA-OAEP-SHA256 | Key wrapping | Randomised padding, no oracle on decrypt |
//! | PKCS#1 v1.5 / SHA-256 | Signatures | Deterministic, universally supported |
//! | AES-256-GCM | Bulk encryption | AEAD, tampering detected before output |
//! | PBKDF2-HMAC-SHA256 | Password keys | Available on every client platform |
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: private PEMs, one-time keys and derived keys are
//!    zeroized when dropped
//! 2. **Secure Random**: `rand::rngs::OsRng` for keys, IVs and salts
//! 3. **No Nonce Reuse**: every encryption draws a fresh key or salt
//! 4. **Blinding**: RSA private operations use blinding

pub mod asymmetric;
pub mod kdf;
pub mod keys;
pub mod symmetric;

pub use kdf::{PBKDF2_ITERATIONS, SALT_SIZE};
pub use keys::{fingerprint, parse_key, KeyPair, ParsedKey, DEFAULT_KEY_BITS, MIN_KEY_BITS};
pub use symmetric::{EncryptionResult, IV_SIZE, KEY_SIZE};
