//! # Symmetric Cipher
//!
//! AES-256-GCM encryption under either a one-time random key or a key
//! derived from a password.
//!
//! ## Random-Key Encryption
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     encrypt_random(data)                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  key = 32 random bytes          iv = 12 random bytes                   │
//! │                                                                         │
//! │  encrypted_data = AES-256-GCM(key, iv, data)   (ciphertext ∥ 16B tag)   │
//! │                                                                         │
//! │  → EncryptionResult { key, iv, encrypted_data }                        │
//! │                                                                         │
//! │  The caller owns the result. Dropping it overwrites key and iv with    │
//! │  zeros, whichever way the owning scope exits.                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Password Encryption
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                encrypt_with_password(data, password)                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  salt      = 32 random bytes                                           │
//! │  (key, iv) = PBKDF2-HMAC-SHA256(password, salt, 16384)                 │
//! │                                                                         │
//! │  blob = salt ∥ AES-256-GCM(key, iv, data)                              │
//! │         ├─32─┤├────── len(data) + 16 ──────┤                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Result Contract
//!
//! | Input | Result |
//! |-------|--------|
//! | Empty data / password / blob | `Some(empty)` |
//! | Wrong key, IV or password, tampered data, short blob | `None` (logged) |
//! | Otherwise | `Some(output)` |
//!
//! The authentication tag means a failed decryption can never be mistaken for
//! a successful one with garbled output.

use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::RngCore;
use zeroize::Zeroize;

use super::kdf::{derive_key_iv, generate_salt, SALT_SIZE};
use crate::error::{Error, Result};

/// Size of the AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of the AES-GCM IV (nonce) in bytes
pub const IV_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Output of a random-key encryption
///
/// ## Security
///
/// `key` and `iv` are overwritten with zeros when the value is dropped, so a
/// result held in a local binding is wiped on every exit path (return, `?`,
/// panic unwind). Call [`EncryptionResult::wipe`] to zero them earlier.
#[derive(Default)]
pub struct EncryptionResult {
    /// Symmetric key
    pub key: Vec<u8>,
    /// Initialisation vector
    pub iv: Vec<u8>,
    /// Ciphertext with authentication tag
    pub encrypted_data: Vec<u8>,
}

impl EncryptionResult {
    /// The result of encrypting nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reassemble a result from its parts (e.g. after unpacking a message)
    pub fn from_parts(key: Vec<u8>, iv: Vec<u8>, encrypted_data: Vec<u8>) -> Self {
        Self {
            key,
            iv,
            encrypted_data,
        }
    }

    /// Whether there is no ciphertext to decrypt
    pub fn is_empty(&self) -> bool {
        self.encrypted_data.is_empty()
    }

    /// Overwrite key and IV with zeros in place, keeping their lengths
    pub fn wipe(&mut self) {
        self.key.as_mut_slice().zeroize();
        self.iv.as_mut_slice().zeroize();
    }
}

impl Drop for EncryptionResult {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
    }
}

impl fmt::Debug for EncryptionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionResult")
            .field("key", &"<redacted>")
            .field("iv", &self.iv.len())
            .field("encrypted_data", &self.encrypted_data.len())
            .finish()
    }
}

/// Encrypt `data` under a freshly generated key and IV
///
/// Returns `None` only if the cipher itself fails.
pub fn encrypt_random(data: &[u8]) -> Option<EncryptionResult> {
    if data.is_empty() {
        return Some(EncryptionResult::empty());
    }

    let mut result = EncryptionResult {
        key: vec![0u8; KEY_SIZE],
        iv: vec![0u8; IV_SIZE],
        encrypted_data: Vec::new(),
    };
    rand::rngs::OsRng.fill_bytes(&mut result.key);
    rand::rngs::OsRng.fill_bytes(&mut result.iv);

    match seal(&result.key, &result.iv, data) {
        Ok(ciphertext) => {
            result.encrypted_data = ciphertext;
            Some(result)
        }
        Err(e) => {
            tracing::error!("encrypt_random: {}", e);
            None
        }
    }
}

/// Decrypt a random-key [`EncryptionResult`]
///
/// Returns `Some(empty)` when there is no ciphertext, `None` when decryption
/// was attempted and failed.
pub fn decrypt(result: &EncryptionResult) -> Option<Vec<u8>> {
    if result.is_empty() {
        return Some(Vec::new());
    }

    match open(&result.key, &result.iv, &result.encrypted_data) {
        Ok(plaintext) => Some(plaintext),
        Err(e) => {
            tracing::warn!("symmetric decrypt: {}", e);
            None
        }
    }
}

/// Encrypt `data` with a key derived from `password`
///
/// Output is `salt ∥ ciphertext`. A fresh salt makes every call produce a
/// different blob.
pub fn encrypt_with_password(data: &[u8], password: &str) -> Option<Vec<u8>> {
    if data.is_empty() || password.is_empty() {
        return Some(Vec::new());
    }

    let salt = generate_salt();
    let derived = derive_key_iv(password.as_bytes(), &salt);

    match seal(derived.key(), derived.iv(), data) {
        Ok(ciphertext) => {
            let mut blob = Vec::with_capacity(SALT_SIZE + ciphertext.len());
            blob.extend_from_slice(&salt);
            blob.extend_from_slice(&ciphertext);
            Some(blob)
        }
        Err(e) => {
            tracing::error!("encrypt_with_password: {}", e);
            None
        }
    }
}

/// Decrypt a `salt ∥ ciphertext` blob with `password`
///
/// A wrong password, tampered blob or a blob too short to hold a salt and a
/// tag all yield `None`.
pub fn decrypt_with_password(blob: &[u8], password: &str) -> Option<Vec<u8>> {
    if blob.is_empty() || password.is_empty() {
        return Some(Vec::new());
    }

    if blob.len() < SALT_SIZE + TAG_SIZE {
        tracing::warn!(
            "decrypt_with_password: blob of {} bytes is too short",
            blob.len()
        );
        return None;
    }

    let (salt, ciphertext) = blob.split_at(SALT_SIZE);
    let derived = derive_key_iv(password.as_bytes(), salt);

    match open(derived.key(), derived.iv(), ciphertext) {
        Ok(plaintext) => Some(plaintext),
        Err(_) => {
            tracing::warn!("decrypt_with_password: wrong password or corrupt data");
            None
        }
    }
}

/// Encrypt UTF-8 `text` with a password and return the blob as base64
pub fn encrypt_str_with_password(text: &str, password: &str) -> Option<String> {
    if text.is_empty() || password.is_empty() {
        return Some(String::new());
    }

    encrypt_with_password(text.as_bytes(), password).map(|blob| BASE64.encode(blob))
}

/// Decrypt a base64 blob produced by [`encrypt_str_with_password`]
pub fn decrypt_str_with_password(blob_b64: &str, password: &str) -> Option<String> {
    if blob_b64.is_empty() || password.is_empty() {
        return Some(String::new());
    }

    let blob = match BASE64.decode(blob_b64.trim()) {
        Ok(blob) => blob,
        Err(e) => {
            tracing::warn!("decrypt_str_with_password: {}", Error::from(e));
            return None;
        }
    };

    let plaintext = decrypt_with_password(&blob, password)?;

    match String::from_utf8(plaintext) {
        Ok(text) => Some(text),
        Err(e) => {
            let mut bytes = e.into_bytes();
            bytes.zeroize();
            tracing::warn!("decrypt_str_with_password: plaintext is not UTF-8");
            None
        }
    }
}

/// AES-256-GCM encrypt with an explicit key and IV
fn seal(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    check_lengths(key, iv).map_err(Error::EncryptionFailed)?;

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| Error::EncryptionFailed(format!("Invalid key: {}", e)))?;

    cipher
        .encrypt(AesNonce::from_slice(iv), plaintext)
        .map_err(|e| Error::EncryptionFailed(format!("AES-GCM: {}", e)))
}

/// AES-256-GCM decrypt with an explicit key and IV
fn open(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    check_lengths(key, iv).map_err(Error::DecryptionFailed)?;

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| Error::DecryptionFailed(format!("Invalid key: {}", e)))?;

    cipher
        .decrypt(AesNonce::from_slice(iv), ciphertext)
        .map_err(|_| Error::DecryptionFailed("authentication tag mismatch".into()))
}

fn check_lengths(key: &[u8], iv: &[u8]) -> std::result::Result<(), String> {
    if key.len() != KEY_SIZE {
        return Err(format!("key must be {} bytes, got {}", KEY_SIZE, key.len()));
    }
    if iv.len() != IV_SIZE {
        return Err(format!("IV must be {} bytes, got {}", IV_SIZE, iv.len()));
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
