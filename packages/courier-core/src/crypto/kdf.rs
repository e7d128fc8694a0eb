//! # Password Key Derivation
//!
//! Turns a password and a random salt into symmetric key material.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    PASSWORD → KEY + IV                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  PBKDF2-HMAC-SHA256(                                                   │
//! │    password   = UTF-8 bytes of the password,                          │
//! │    salt       = 32 random bytes (fresh per encryption),               │
//! │    iterations = 16384,                                                │
//! │    output     = 44 bytes                                              │
//! │  )                                                                     │
//! │                                                                         │
//! │  output[0..32]  → AES-256 key                                          │
//! │  output[32..44] → 96-bit IV                                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The iteration count is fixed: changing it would make every stored blob
//! undecryptable.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::symmetric::{IV_SIZE, KEY_SIZE};

/// Size of the random salt prepended to password-encrypted blobs
pub const SALT_SIZE: usize = 32;

/// PBKDF2 iteration count
pub const PBKDF2_ITERATIONS: u32 = 16_384;

/// Key and IV derived from a password; zeroized when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
    iv: [u8; IV_SIZE],
}

impl DerivedKey {
    /// AES-256 key bytes
    pub fn key(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    /// IV bytes
    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }
}

/// Generate a random salt
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive key and IV from `password` and `salt`
pub fn derive_key_iv(password: &[u8], salt: &[u8]) -> DerivedKey {
    let mut output = [0u8; KEY_SIZE + IV_SIZE];
    pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, &mut output);

    let mut derived = DerivedKey {
        key: [0u8; KEY_SIZE],
        iv: [0u8; IV_SIZE],
    };
    derived.key.copy_from_slice(&output[..KEY_SIZE]);
    derived.iv.copy_from_slice(&output[KEY_SIZE..]);

    output.zeroize();
    derived
}

// ============================================================================
// TESTS
// ============================================================================
