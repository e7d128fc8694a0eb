//! # Asymmetric Cipher
//!
//! Stateless RSA encrypt / decrypt / sign / verify over PEM text keys.
//!
//! ## Operations
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ASYMMETRIC OPERATIONS                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Operation   Key accepted        Scheme                 On failure      │
//! │  ─────────   ────────────        ──────                 ──────────      │
//! │  encrypt     public or private   RSA-OAEP (SHA-256)     Err             │
//! │  decrypt     private only        RSA-OAEP (SHA-256)     Err             │
//! │  sign        private only        PKCS#1 v1.5 / SHA-256  None            │
//! │  verify      public only         PKCS#1 v1.5 / SHA-256  false           │
//! │                                                                         │
//! │  Empty input or empty key: encrypt/decrypt return an empty buffer,     │
//! │  sign returns None, verify returns false.                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Encryption accepts a private key because the public component can always
//! be recovered from it. Verification does not: a private key handed to
//! [`verify`] yields `false`, so the two roles stay distinct for signatures.
//!
//! Decrypting with a public key is impossible by construction and surfaces as
//! [`Error::PrivateKeyRequired`], which callers should let propagate.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::rngs::OsRng;
use rsa::{Oaep, Pkcs1v15Sign};
use sha2::{Digest, Sha256};

use crate::crypto::keys::{parse_key, ParsedKey};
use crate::error::{Error, Result};

/// Encrypt `plaintext` with an RSA key
///
/// Either half of a keypair may be used; a private key encrypts under its
/// public component.
///
/// ## Errors
///
/// - `InvalidKey` if the key text cannot be parsed
/// - `EncryptionFailed` if the plaintext is too long for the modulus
pub fn encrypt(plaintext: &[u8], key: &str) -> Result<Vec<u8>> {
    if plaintext.is_empty() || key.trim().is_empty() {
        return Ok(Vec::new());
    }

    let public = parse_key(key)?.to_public();

    public
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext)
        .map_err(|e| Error::EncryptionFailed(format!("RSA-OAEP: {}", e)))
}

/// Decrypt `ciphertext` with an RSA private key
///
/// ## Errors
///
/// - `PrivateKeyRequired` if `key` is a public key (hard failure)
/// - `InvalidKey` if the key text cannot be parsed
/// - `DecryptionFailed` for a wrong key or corrupt ciphertext
pub fn decrypt(ciphertext: &[u8], key: &str) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || key.trim().is_empty() {
        return Ok(Vec::new());
    }

    let private = match parse_key(key)? {
        ParsedKey::Private(private) => private,
        ParsedKey::Public(_) => return Err(Error::PrivateKeyRequired("decrypt")),
    };

    private
        .decrypt_blinded(&mut OsRng, Oaep::new::<Sha256>(), ciphertext)
        .map_err(|_| Error::DecryptionFailed("RSA-OAEP decryption error".into()))
}

/// Sign `message` with an RSA private key
///
/// Returns `None` when no signature can be produced: empty input, a public
/// key, or an unparsable key. The reason is logged.
pub fn sign(message: &[u8], key: &str) -> Option<Vec<u8>> {
    if message.is_empty() || key.trim().is_empty() {
        tracing::debug!("sign: empty message or key, nothing to sign");
        return None;
    }

    let private = match parse_key(key) {
        Ok(ParsedKey::Private(private)) => private,
        Ok(ParsedKey::Public(_)) => {
            tracing::warn!("sign: a public key cannot produce signatures");
            return None;
        }
        Err(e) => {
            tracing::error!("sign: {}", e);
            return None;
        }
    };

    let digest = Sha256::digest(message);

    match private.sign_with_rng(&mut OsRng, Pkcs1v15Sign::new::<Sha256>(), &digest) {
        Ok(signature) => Some(signature),
        Err(e) => {
            tracing::error!("sign: RSA signing failed: {}", e);
            None
        }
    }
}

/// Verify an RSA signature over `message`
///
/// Never fails: a malformed signature, wrong key, tampered message, empty
/// input or a private key all yield `false`.
pub fn verify(message: &[u8], signature: &[u8], key: &str) -> bool {
    if message.is_empty() || signature.is_empty() || key.trim().is_empty() {
        return false;
    }

    let public = match parse_key(key) {
        Ok(ParsedKey::Public(public)) => public,
        Ok(ParsedKey::Private(_)) => {
            tracing::debug!("verify: a private key is not a verification key");
            return false;
        }
        Err(e) => {
            tracing::debug!("verify: {}", e);
            return false;
        }
    };

    let digest = Sha256::digest(message);

    public
        .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature)
        .is_ok()
}

/// Sign and return the signature as base64 text
pub fn sign_base64(message: &[u8], key: &str) -> Option<String> {
    sign(message, key).map(|signature| BASE64.encode(signature))
}

/// Verify a base64 signature; undecodable text yields `false`
pub fn verify_base64(message: &[u8], signature_b64: &str, key: &str) -> bool {
    match BASE64.decode(signature_b64.trim()) {
        Ok(signature) => verify(message, &signature, key),
        Err(_) => false,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{alice, bob};

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let kp = alice();
        let plaintext = b"Hello, Bob!";

        let ciphertext = encrypt(plaintext, kp.public_key()).unwrap();
        assert_ne!(ciphertext, plaintext);

        let decrypted = decrypt(&ciphertext, kp.private_key()).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_encrypt_with_private_key() {
        let kp = alice();

        let ciphertext = encrypt(b"either half works", kp.private_key()).unwrap();
        let decrypted = decrypt(&ciphertext, kp.private_key()).unwrap();

        assert_eq!(decrypted, b"either half works");
    }

    #[test]
    fn test_decrypt_with_public_key_is_structural() {
        let kp = alice();
        let ciphertext = encrypt(b"secret", kp.public_key()).unwrap();

        let err = decrypt(&ciphertext, kp.public_key()).unwrap_err();
        assert!(matches!(err, Error::PrivateKeyRequired(_)));
        assert!(err.is_structural());
    }

    #[test]
    fn test_decrypt_with_wrong_private_key() {
        let ciphertext = encrypt(b"secret", alice().public_key()).unwrap();

        let result = decrypt(&ciphertext, bob().private_key());
        assert!(matches!(result, Err(Error::DecryptionFailed(_))));
    }

    #[test]
    fn test_empty_inputs() {
        let kp = alice();

        assert!(encrypt(b"", kp.public_key()).unwrap().is_empty());
        assert!(encrypt(b"data", "").unwrap().is_empty());
        assert!(decrypt(b"", kp.private_key()).unwrap().is_empty());
        assert!(decrypt(b"data", "  ").unwrap().is_empty());
        assert!(sign(b"", kp.private_key()).is_none());
        assert!(sign(b"data", "").is_none());
        assert!(!verify(b"", b"sig", kp.public_key()));
    }

    #[test]
    fn test_encrypt_malformed_key() {
        let result = encrypt(
            b"data",
            "-----BEGIN PUBLIC KEY-----\ngarbage\n-----END PUBLIC KEY-----",
        );
        assert!(matches!(result, Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_encrypt_oversized_plaintext() {
        // 2048-bit OAEP-SHA256 fits at most 190 bytes
        let result = encrypt(&[7u8; 300], alice().public_key());
        assert!(matches!(result, Err(Error::EncryptionFailed(_))));
    }

    #[test]
    fn test_sign_verify() {
        let kp = alice();
        let message = b"Hello, World!";

        let signature = sign(message, kp.private_key()).unwrap();

        assert!(verify(message, &signature, kp.public_key()));
        assert!(!verify(message, &signature, bob().public_key()));
        assert!(!verify(message, &signature, kp.private_key()));
    }

    #[test]
    fn test_verify_tampered_message() {
        let kp = alice();
        let signature = sign(b"original", kp.private_key()).unwrap();

        assert!(!verify(b"tampered", &signature, kp.public_key()));
    }

    #[test]
    fn test_verify_malformed_signature() {
        let kp = alice();

        assert!(!verify(b"message", &[1, 2, 3], kp.public_key()));
        assert!(!verify(b"message", &[0u8; 256], kp.public_key()));
        assert!(!verify(b"message", &[1, 2, 3], "not a key"));
    }

    #[test]
    fn test_sign_with_public_key_returns_none() {
        assert!(sign(b"message", alice().public_key()).is_none());
        assert!(sign(b"message", "not a key").is_none());
    }

    #[test]
    fn test_deterministic_signatures() {
        let kp = alice();

        // PKCS#1 v1.5 is deterministic even with blinding
        let sig1 = sign(b"same", kp.private_key()).unwrap();
        let sig2 = sign(b"same", kp.private_key()).unwrap();
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_base64_signature_helpers() {
        let kp = alice();

        let signature = sign_base64(b"payload", kp.private_key()).unwrap();
        assert!(verify_base64(b"payload", &signature, kp.public_key()));
        assert!(!verify_base64(b"payload", "!!not base64!!", kp.public_key()));
    }
}
