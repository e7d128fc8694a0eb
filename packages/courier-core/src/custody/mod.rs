//! # Key Custody
//!
//! Lets an untrusted server store a user's private key without being able
//! to read it.
//!
//! ## Custody Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ZERO-KNOWLEDGE CUSTODY                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Registration                                                          │
//! │  ─────────────────────────────────────────────────────────────          │
//! │  KeyPair::generate()                                                   │
//! │       │                                                                │
//! │       ├── public  ──► compress ──────────────────────────► server      │
//! │       │                                                                │
//! │       └── private ──► encrypt_with_password(raw password)              │
//! │                        ──► compress ──► base64 ───────────► server      │
//! │                                                                         │
//! │  Login                                                                 │
//! │  ─────────────────────────────────────────────────────────────          │
//! │  server ──► blob ──► decompress ──► decrypt_with_password ──► memory   │
//! │                                                                         │
//! │  Password change                                                       │
//! │  ─────────────────────────────────────────────────────────────          │
//! │  blob ──► unwrap(old) ──► wrap(new) ──► server                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Password Separation
//!
//! The server authenticates the user with a *hash* of the password. Custody
//! encrypts with the *raw* password, which the server never sees. Mixing the
//! two would hand the server everything it needs to decrypt the key, so the
//! custody API only accepts [`UserPassword`], a type that cannot be built
//! from or turned into an authentication hash.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::compression::SharedCodec;
use crate::crypto::symmetric;
use crate::crypto::KeyPair;

/// The user's raw password, held only for the duration of a custody call
///
/// Zeroized on drop. Deliberately has no `Clone`, `Display`, `Serialize`
/// or any accessor returning a hash.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct UserPassword(String);

impl UserPassword {
    /// Take ownership of the raw password text
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Whether the password is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserPassword(<redacted>)")
    }
}

/// A keypair in its custody form, as exchanged with the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedKeyPair {
    /// Compressed public key
    pub public_key: String,
    /// Password-encrypted, compressed private key
    pub private_key: String,
}

/// Wraps and unwraps key material for server-side storage
#[derive(Debug, Clone)]
pub struct KeyCustody {
    codec: SharedCodec,
}

impl KeyCustody {
    /// Create a custody helper using `codec` for compression
    pub fn new(codec: SharedCodec) -> Self {
        Self { codec }
    }

    /// Encrypt a private key PEM with the user's raw password
    ///
    /// Output is `base64(compress(salt ∥ ciphertext))`. Returns `Some("")`
    /// for empty input and `None` on failure.
    pub fn wrap_private_key(&self, private_key: &str, password: &UserPassword) -> Option<String> {
        if private_key.is_empty() || password.is_empty() {
            tracing::info!("wrap_private_key: empty input");
            return Some(String::new());
        }

        let blob = symmetric::encrypt_with_password(private_key.as_bytes(), password.expose())?;

        match self.codec.compress_bytes(&blob) {
            Ok(compressed) => Some(BASE64.encode(compressed)),
            Err(e) => {
                tracing::error!("wrap_private_key: {}", e);
                None
            }
        }
    }

    /// Recover a private key PEM from its wrapped form
    ///
    /// A wrong password or damaged blob yields `None`.
    pub fn unwrap_private_key(
        &self,
        wrapped: &str,
        password: &UserPassword,
    ) -> Option<Zeroizing<String>> {
        if wrapped.trim().is_empty() || password.is_empty() {
            tracing::info!("unwrap_private_key: empty input");
            return Some(Zeroizing::new(String::new()));
        }

        let blob = match self.decode(wrapped) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!("unwrap_private_key: {}", e);
                return None;
            }
        };

        let plaintext = symmetric::decrypt_with_password(&blob, password.expose())?;

        match String::from_utf8(plaintext) {
            Ok(pem) => Some(Zeroizing::new(pem)),
            Err(e) => {
                e.into_bytes().zeroize();
                tracing::warn!("unwrap_private_key: key is not UTF-8");
                None
            }
        }
    }

    /// Compress a public key for transport (no encryption)
    pub fn wrap_public_key(&self, public_key: &str) -> Option<String> {
        match self.codec.compress(public_key) {
            Ok(wrapped) => Some(wrapped),
            Err(e) => {
                tracing::error!("wrap_public_key: {}", e);
                None
            }
        }
    }

    /// Reverse [`KeyCustody::wrap_public_key`]
    pub fn unwrap_public_key(&self, wrapped: &str) -> Option<String> {
        match self.codec.decompress(wrapped) {
            Ok(public_key) => Some(public_key),
            Err(e) => {
                tracing::warn!("unwrap_public_key: {}", e);
                None
            }
        }
    }

    /// Wrap both halves of a keypair for registration
    pub fn wrap_keypair(
        &self,
        keypair: &KeyPair,
        password: &UserPassword,
    ) -> Option<WrappedKeyPair> {
        if password.is_empty() {
            tracing::warn!("wrap_keypair: refusing to wrap with an empty password");
            return None;
        }

        Some(WrappedKeyPair {
            public_key: self.wrap_public_key(keypair.public_key())?,
            private_key: self.wrap_private_key(keypair.private_key(), password)?,
        })
    }

    /// Restore a keypair at login
    ///
    /// Fails with `None` for a wrong password or if the halves do not
    /// belong together.
    pub fn unwrap_keypair(
        &self,
        wrapped: &WrappedKeyPair,
        password: &UserPassword,
    ) -> Option<KeyPair> {
        let public_key = self.unwrap_public_key(&wrapped.public_key)?;
        let private_key = self.unwrap_private_key(&wrapped.private_key, password)?;

        match KeyPair::from_pem(&public_key, &private_key) {
            Ok(keypair) => {
                tracing::info!(
                    "Unwrapped keypair {}",
                    keypair.fingerprint().unwrap_or_default()
                );
                Some(keypair)
            }
            Err(e) => {
                tracing::warn!("unwrap_keypair: {}", e);
                None
            }
        }
    }

    /// Re-encrypt a wrapped private key under a new password
    ///
    /// Returns `None` if `old` does not open the blob or either password is
    /// empty. An empty blob stays empty. The server never needs to see
    /// either password.
    pub fn rewrap_private_key(
        &self,
        wrapped: &str,
        old: &UserPassword,
        new: &UserPassword,
    ) -> Option<String> {
        if old.is_empty() || new.is_empty() {
            tracing::warn!("rewrap_private_key: refusing an empty password");
            return None;
        }
        if wrapped.trim().is_empty() {
            tracing::info!("rewrap_private_key: empty input");
            return Some(String::new());
        }

        // A non-empty blob must never rewrap to an empty one
        let private_key = self.unwrap_private_key(wrapped, old)?;
        if private_key.is_empty() {
            tracing::warn!("rewrap_private_key: blob opened to an empty key");
            return None;
        }

        self.wrap_private_key(&private_key, new)
    }

    fn decode(&self, wrapped: &str) -> crate::Result<Vec<u8>> {
        let compressed = BASE64.decode(wrapped.trim())?;
        self.codec.decompress_bytes(&compressed)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::default_codec;
    use crate::test_support::{alice, bob};

    fn custody() -> KeyCustody {
        KeyCustody::new(default_codec())
    }

    #[test]
    fn test_password_scenario() {
        let custody = custody();
        let key = alice().private_key();
        let password = UserPassword::new("Tr0ub4dor&3");

        let wrapped = custody.wrap_private_key(key, &password).unwrap();
        assert!(!wrapped.contains("PRIVATE KEY"));

        let unwrapped = custody.unwrap_private_key(&wrapped, &password).unwrap();
        assert_eq!(unwrapped.as_str(), key);

        let wrong = custody.unwrap_private_key(&wrapped, &UserPassword::new("wrong-pw"));
        assert!(wrong.is_none());
    }

    #[test]
    fn test_wrapping_is_salted() {
        let custody = custody();
        let password = UserPassword::new("pw");

        let a = custody.wrap_private_key("same key text", &password).unwrap();
        let b = custody.wrap_private_key("same key text", &password).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_public_key_compression_only() {
        let custody = custody();
        let public = alice().public_key();

        let wrapped = custody.wrap_public_key(public).unwrap();
        assert_ne!(wrapped, public);
        assert_eq!(custody.unwrap_public_key(&wrapped).unwrap(), public);

        // Anyone holding the codec can read it back
        assert_eq!(default_codec().decompress(&wrapped).unwrap(), public);
    }

    #[test]
    fn test_empty_inputs() {
        let custody = custody();
        let password = UserPassword::new("pw");

        assert_eq!(custody.wrap_private_key("", &password).unwrap(), "");
        assert_eq!(custody.wrap_private_key("k", &UserPassword::new("")).unwrap(), "");
        assert!(custody.unwrap_private_key("", &password).unwrap().is_empty());
        assert_eq!(custody.wrap_public_key("").unwrap(), "");
        assert_eq!(custody.unwrap_public_key("").unwrap(), "");
    }

    #[test]
    fn test_damaged_blob_returns_none() {
        let custody = custody();
        let password = UserPassword::new("pw");

        assert!(custody.unwrap_private_key("%%%", &password).is_none());
        assert!(custody
            .unwrap_private_key(&BASE64.encode(b"not compressed"), &password)
            .is_none());
        assert!(custody.unwrap_public_key("%%%").is_none());
    }

    #[test]
    fn test_keypair_round_trip() {
        let custody = custody();
        let kp = bob();
        let password = UserPassword::new("correct horse battery staple");

        let wrapped = custody.wrap_keypair(kp, &password).unwrap();
        let restored = custody.unwrap_keypair(&wrapped, &password).unwrap();

        assert_eq!(restored.public_key(), kp.public_key());
        assert_eq!(restored.private_key(), kp.private_key());
        assert!(custody
            .unwrap_keypair(&wrapped, &UserPassword::new("nope"))
            .is_none());
    }

    #[test]
    fn test_wrapped_keypair_json_shape() {
        let wrapped = WrappedKeyPair {
            public_key: "pub".into(),
            private_key: "priv".into(),
        };

        let json = serde_json::to_string(&wrapped).unwrap();
        assert_eq!(json, r#"{"publicKey":"pub","privateKey":"priv"}"#);
        assert_eq!(serde_json::from_str::<WrappedKeyPair>(&json).unwrap(), wrapped);
    }

    #[test]
    fn test_unwrap_keypair_rejects_mismatched_halves() {
        let custody = custody();
        let password = UserPassword::new("pw");

        let mut wrapped = custody.wrap_keypair(alice(), &password).unwrap();
        wrapped.public_key = custody.wrap_public_key(bob().public_key()).unwrap();

        assert!(custody.unwrap_keypair(&wrapped, &password).is_none());
    }

    #[test]
    fn test_wrap_keypair_requires_password() {
        assert!(custody()
            .wrap_keypair(alice(), &UserPassword::new(""))
            .is_none());
    }

    #[test]
    fn test_rewrap_after_password_change() {
        let custody = custody();
        let key = alice().private_key();
        let old = UserPassword::new("old-password");
        let new = UserPassword::new("new-password");

        let wrapped = custody.wrap_private_key(key, &old).unwrap();
        let rewrapped = custody.rewrap_private_key(&wrapped, &old, &new).unwrap();

        assert_eq!(custody.unwrap_private_key(&rewrapped, &new).unwrap().as_str(), key);
        assert!(custody.unwrap_private_key(&rewrapped, &old).is_none());
        assert!(custody
            .rewrap_private_key(&wrapped, &UserPassword::new("guess"), &new)
            .is_none());
    }

    #[test]
    fn test_rewrap_refuses_empty_passwords() {
        let custody = custody();
        let old = UserPassword::new("old");
        let wrapped = custody.wrap_private_key(alice().private_key(), &old).unwrap();

        assert!(custody
            .rewrap_private_key(&wrapped, &UserPassword::new(""), &UserPassword::new("new"))
            .is_none());
        assert!(custody
            .rewrap_private_key(&wrapped, &old, &UserPassword::new(""))
            .is_none());

        // The stored blob is untouched and still opens
        assert_eq!(
            custody.unwrap_private_key(&wrapped, &old).unwrap().as_str(),
            alice().private_key()
        );
    }

    #[test]
    fn test_rewrap_empty_blob_stays_empty() {
        let custody = custody();
        let rewrapped = custody
            .rewrap_private_key("", &UserPassword::new("old"), &UserPassword::new("new"))
            .unwrap();
        assert!(rewrapped.is_empty());
    }

    #[test]
    fn test_custody_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<KeyCustody>();
    }

    #[test]
    fn test_password_debug_redacted() {
        let password = UserPassword::new("Tr0ub4dor&3");
        assert!(!format!("{:?}", password).contains("Tr0ub4dor"));
    }
}
