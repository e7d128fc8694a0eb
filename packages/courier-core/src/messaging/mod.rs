//! # Messaging Module
//!
//! Hybrid end-to-end encryption of chat payloads for a single recipient.
//!
//! ## Message Encryption Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      MESSAGE ENCRYPTION                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Sender (Alice)                                                        │
//! │  ─────────────────────────────────────────────────────────────         │
//! │                                                                         │
//! │  Input: {"text":"hello"}, bob_public_key                              │
//! │                                                                         │
//! │  1. One-time symmetric encryption                                      │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  symmetric::encrypt_random(plaintext)                      │       │
//! │  │  → { key (32B), iv (12B), encrypted_data }                 │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  2. Wrap the one-time key for the recipient                            │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  asymmetric::encrypt(key, bob_public_key) = encrypted_key  │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  3. Pack                                                               │
//! │  ┌─────────────────────────────────────────────────────────────┐       │
//! │  │  b64(encrypted_key) | b64(iv) | b64(encrypted_data)        │       │
//! │  └─────────────────────────────────────────────────────────────┘       │
//! │                                                                         │
//! │  4. Compress the packed text as a whole (configured codec)             │
//! │                                                                         │
//! │  Output: base64 text, safe for JSON transport                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Message Decryption Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      MESSAGE DECRYPTION                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Recipient (Bob)                                                       │
//! │  ─────────────────────────────────────────────────────────────         │
//! │                                                                         │
//! │  1. Decompress, split on '|'   (exactly 3 non-empty fields)            │
//! │  2. asymmetric::decrypt(encrypted_key, bob_private_key) = key          │
//! │  3. symmetric::decrypt({ key, iv, encrypted_data }) = plaintext        │
//! │  4. UTF-8 decode                                                       │
//! │                                                                         │
//! │  Any failure ─► Ok(None)                                               │
//! │  Public key given instead of private ─► Err(PrivateKeyRequired)        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every step after decompression is authenticated (OAEP for the key,
//! AES-GCM for the body), so a tampered or misaddressed message can only
//! produce `None`, never a different plaintext.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use zeroize::{Zeroize, Zeroizing};

use crate::compression::SharedCodec;
use crate::crypto::asymmetric;
use crate::crypto::symmetric::{self, EncryptionResult};
use crate::error::{Error, Result};

/// Separator between the three packed fields
pub const FIELD_SEPARATOR: char = '|';

/// The three decoded fields of a packed hybrid message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HybridPayload {
    /// One-time symmetric key, RSA-encrypted for the recipient
    pub encrypted_key: Vec<u8>,
    /// Symmetric IV
    pub iv: Vec<u8>,
    /// Symmetric ciphertext with authentication tag
    pub ciphertext: Vec<u8>,
}

impl HybridPayload {
    /// Join the fields as `b64 | b64 | b64`
    pub fn pack(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            BASE64.encode(&self.encrypted_key),
            BASE64.encode(&self.iv),
            BASE64.encode(&self.ciphertext),
            sep = FIELD_SEPARATOR
        )
    }

    /// Split packed text back into its fields
    ///
    /// ## Errors
    ///
    /// - `MalformedMessage` unless there are exactly three non-empty fields
    /// - `InvalidEncoding` if a field is not base64
    pub fn unpack(packed: &str) -> Result<Self> {
        let fields: Vec<&str> = packed.trim().split(FIELD_SEPARATOR).collect();

        if fields.len() != 3 {
            return Err(Error::MalformedMessage(format!(
                "expected 3 fields, found {}",
                fields.len()
            )));
        }
        if fields.iter().any(|f| f.is_empty()) {
            return Err(Error::MalformedMessage("empty field".into()));
        }

        Ok(Self {
            encrypted_key: BASE64.decode(fields[0])?,
            iv: BASE64.decode(fields[1])?,
            ciphertext: BASE64.decode(fields[2])?,
        })
    }
}

/// Hybrid RSA + AES message encryption
///
/// Stateless apart from the shared codec; cheap to clone and safe to use
/// from many threads.
///
/// ## Example
///
/// ```ignore
/// let cipher = MessageCipher::new(courier_core::compression::default_codec());
///
/// let packed = cipher.encrypt_message(r#"{"text":"hello"}"#, bob.public_key()).unwrap();
/// let plain = cipher.decrypt_message(&packed, bob.private_key())?.unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct MessageCipher {
    codec: SharedCodec,
}

impl MessageCipher {
    /// Create a cipher using `codec` for the outer compression
    pub fn new(codec: SharedCodec) -> Self {
        Self { codec }
    }

    /// The codec in use
    pub fn codec(&self) -> &SharedCodec {
        &self.codec
    }

    /// Encrypt `plaintext` for the holder of `recipient_public_key`
    ///
    /// Returns `Some("")` for empty input and `None` if any stage fails.
    /// A partially built message is never returned.
    pub fn encrypt_message(&self, plaintext: &str, recipient_public_key: &str) -> Option<String> {
        if plaintext.is_empty() || recipient_public_key.trim().is_empty() {
            tracing::info!("encrypt_message: empty input, nothing to encrypt");
            return Some(String::new());
        }

        // Dropping `sealed` zeroes the one-time key on every path below
        let sealed = symmetric::encrypt_random(plaintext.as_bytes())?;

        let encrypted_key = match asymmetric::encrypt(&sealed.key, recipient_public_key) {
            Ok(encrypted_key) => encrypted_key,
            Err(e) => {
                tracing::error!("encrypt_message: key wrapping failed: {}", e);
                return None;
            }
        };

        let payload = HybridPayload {
            encrypted_key,
            iv: sealed.iv.clone(),
            ciphertext: sealed.encrypted_data.clone(),
        };

        match self.codec.compress(&payload.pack()) {
            Ok(packed) => {
                tracing::debug!(
                    "Encrypted message: {} bytes → {} chars ({})",
                    plaintext.len(),
                    packed.len(),
                    self.codec.name()
                );
                Some(packed)
            }
            Err(e) => {
                tracing::error!("encrypt_message: compression failed: {}", e);
                None
            }
        }
    }

    /// Decrypt a packed message with the recipient's own private key
    ///
    /// - `Ok(Some(""))` for empty input
    /// - `Ok(None)` for a wrong key, tampering or a malformed message
    /// - `Err(PrivateKeyRequired)` if `private_key` is a public key
    pub fn decrypt_message(&self, packed: &str, private_key: &str) -> Result<Option<String>> {
        if packed.trim().is_empty() || private_key.trim().is_empty() {
            tracing::info!("decrypt_message: empty input, nothing to decrypt");
            return Ok(Some(String::new()));
        }

        let joined = match self.codec.decompress(packed) {
            Ok(joined) => joined,
            Err(e) => {
                tracing::warn!("decrypt_message: {}", e);
                return Ok(None);
            }
        };

        let payload = match HybridPayload::unpack(&joined) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("decrypt_message: {}", e);
                return Ok(None);
            }
        };

        let key = match asymmetric::decrypt(&payload.encrypted_key, private_key) {
            Ok(key) => Zeroizing::new(key),
            Err(e) if e.is_structural() => return Err(e),
            Err(e) => {
                tracing::warn!("decrypt_message: key unwrapping failed: {}", e);
                return Ok(None);
            }
        };

        let sealed = EncryptionResult::from_parts(key.to_vec(), payload.iv, payload.ciphertext);
        let Some(plaintext) = symmetric::decrypt(&sealed) else {
            tracing::warn!("decrypt_message: body decryption failed");
            return Ok(None);
        };

        match String::from_utf8(plaintext) {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                e.into_bytes().zeroize();
                tracing::warn!("decrypt_message: plaintext is not UTF-8");
                Ok(None)
            }
        }
    }

    /// [`MessageCipher::encrypt_message`] on the blocking thread pool
    pub async fn encrypt_message_async(
        &self,
        plaintext: String,
        recipient_public_key: String,
    ) -> Option<String> {
        let cipher = self.clone();
        let task = tokio::task::spawn_blocking(move || {
            cipher.encrypt_message(&plaintext, &recipient_public_key)
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("encrypt_message_async: {}", e);
                None
            }
        }
    }

    /// [`MessageCipher::decrypt_message`] on the blocking thread pool
    pub async fn decrypt_message_async(
        &self,
        packed: String,
        private_key: Zeroizing<String>,
    ) -> Result<Option<String>> {
        let cipher = self.clone();
        tokio::task::spawn_blocking(move || cipher.decrypt_message(&packed, &private_key)).await?
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::{default_codec, CodecKind};
    use crate::test_support::{alice, bob};

    fn cipher() -> MessageCipher {
        MessageCipher::new(default_codec())
    }

    #[test]
    fn test_hello_scenario() {
        let cipher = cipher();
        let recipient = alice();

        let packed = cipher
            .encrypt_message(r#"{"text":"hello"}"#, recipient.public_key())
            .unwrap();
        assert!(!packed.is_empty());
        assert!(!packed.contains("hello"));

        let decrypted = cipher
            .decrypt_message(&packed, recipient.private_key())
            .unwrap();
        assert_eq!(decrypted.as_deref(), Some(r#"{"text":"hello"}"#));

        // Unrelated keypair
        let intercepted = cipher.decrypt_message(&packed, bob().private_key()).unwrap();
        assert_eq!(intercepted, None);
    }

    #[test]
    fn test_round_trip_all_codecs() {
        let message = r#"{"text":"ünïcödé ✓","attachments":[]}"#;

        for kind in [CodecKind::Deflate, CodecKind::Zlib, CodecKind::Zstd] {
            let cipher = MessageCipher::new(kind.build(6, 1024 * 1024));
            let packed = cipher.encrypt_message(message, bob().public_key()).unwrap();

            assert_eq!(
                cipher.decrypt_message(&packed, bob().private_key()).unwrap().as_deref(),
                Some(message),
                "codec {}",
                kind
            );
        }
    }

    #[test]
    fn test_fresh_key_per_message() {
        let cipher = cipher();

        let a = cipher.encrypt_message("same", alice().public_key()).unwrap();
        let b = cipher.encrypt_message("same", alice().public_key()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_public_key_decrypt_is_structural() {
        let cipher = cipher();
        let packed = cipher.encrypt_message("secret", alice().public_key()).unwrap();

        let err = cipher
            .decrypt_message(&packed, alice().public_key())
            .unwrap_err();
        assert!(matches!(err, Error::PrivateKeyRequired(_)));
    }

    #[test]
    fn test_tampered_message_returns_none() {
        let cipher = cipher();
        let packed = cipher
            .encrypt_message(r#"{"text":"hello"}"#, alice().public_key())
            .unwrap();

        let mut raw = BASE64.decode(&packed).unwrap();
        let middle = raw.len() / 2;
        raw[middle] ^= 0x01;
        let tampered = BASE64.encode(raw);

        let result = cipher.decrypt_message(&tampered, alice().private_key()).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_tampered_field_returns_none() {
        let cipher = cipher();
        let packed = cipher.encrypt_message("body", alice().public_key()).unwrap();

        // Tamper below the compression layer so only the AEAD can notice
        let joined = cipher.codec().decompress(&packed).unwrap();
        let mut payload = HybridPayload::unpack(&joined).unwrap();
        payload.ciphertext[0] ^= 0xFF;
        let repacked = cipher.codec().compress(&payload.pack()).unwrap();

        let result = cipher.decrypt_message(&repacked, alice().private_key()).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_malformed_field_count_returns_none() {
        let cipher = cipher();
        let codec = cipher.codec().clone();

        for joined in ["onlyone", "a|b", "a|b|c|d", "QQ==||QQ=="] {
            let packed = codec.compress(joined).unwrap();
            assert_eq!(
                cipher.decrypt_message(&packed, alice().private_key()).unwrap(),
                None,
                "{:?}",
                joined
            );
        }
    }

    #[test]
    fn test_garbage_input_returns_none() {
        let cipher = cipher();

        assert_eq!(
            cipher.decrypt_message("not compressed at all", alice().private_key()).unwrap(),
            None
        );
        assert_eq!(
            cipher.decrypt_message(&packed_garbage(), alice().private_key()).unwrap(),
            None
        );
    }

    fn packed_garbage() -> String {
        BASE64.encode([0xDEu8, 0xAD, 0xBE, 0xEF])
    }

    #[test]
    fn test_empty_inputs() {
        let cipher = cipher();

        assert_eq!(cipher.encrypt_message("", alice().public_key()).unwrap(), "");
        assert_eq!(cipher.encrypt_message("x", "").unwrap(), "");
        assert_eq!(
            cipher.decrypt_message("", alice().private_key()).unwrap(),
            Some(String::new())
        );
        assert_eq!(
            cipher.decrypt_message("abc", " ").unwrap(),
            Some(String::new())
        );
    }

    #[test]
    fn test_encrypt_with_malformed_key_returns_none() {
        assert!(cipher().encrypt_message("hi", "not a key").is_none());
    }

    #[test]
    fn test_payload_pack_unpack() {
        let payload = HybridPayload {
            encrypted_key: vec![1, 2, 3],
            iv: vec![4, 5],
            ciphertext: vec![6],
        };

        let packed = payload.pack();
        assert_eq!(packed.matches(FIELD_SEPARATOR).count(), 2);
        assert_eq!(HybridPayload::unpack(&packed).unwrap(), payload);
        assert!(matches!(
            HybridPayload::unpack("AQ==|!!|AQ=="),
            Err(Error::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_cipher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<MessageCipher>();
    }

    #[test]
    fn test_parallel_decrypt_on_two_threads() {
        let cipher = cipher();
        let for_alice = cipher
            .encrypt_message(r#"{"text":"to alice"}"#, alice().public_key())
            .unwrap();
        let for_bob = cipher
            .encrypt_message(r#"{"text":"to bob"}"#, bob().public_key())
            .unwrap();

        let alice_cipher = cipher.clone();
        let alice_thread = std::thread::spawn(move || {
            alice_cipher.decrypt_message(&for_alice, alice().private_key())
        });
        let bob_cipher = cipher.clone();
        let bob_thread = std::thread::spawn(move || {
            bob_cipher.decrypt_message(&for_bob, bob().private_key())
        });

        let alice_plain = alice_thread.join().unwrap().unwrap();
        let bob_plain = bob_thread.join().unwrap().unwrap();
        assert_eq!(alice_plain.as_deref(), Some(r#"{"text":"to alice"}"#));
        assert_eq!(bob_plain.as_deref(), Some(r#"{"text":"to bob"}"#));
    }

    #[tokio::test]
    async fn test_async_matches_sync() {
        let cipher = cipher();
        let kp = bob();

        let packed = cipher
            .encrypt_message_async("async hello".into(), kp.public_key().into())
            .await
            .unwrap();

        assert_eq!(
            cipher.decrypt_message(&packed, kp.private_key()).unwrap().as_deref(),
            Some("async hello")
        );

        let decrypted = cipher
            .decrypt_message_async(packed, Zeroizing::new(kp.private_key().to_string()))
            .await
            .unwrap();
        assert_eq!(decrypted.as_deref(), Some("async hello"));
    }

    #[tokio::test]
    async fn test_async_public_key_is_structural() {
        let cipher = cipher();
        let packed = cipher.encrypt_message("x", alice().public_key()).unwrap();

        let result = cipher
            .decrypt_message_async(packed, Zeroizing::new(alice().public_key().to_string()))
            .await;
        assert!(matches!(result, Err(Error::PrivateKeyRequired(_))));
    }
}
