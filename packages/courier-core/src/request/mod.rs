//! # Request Authentication
//!
//! Signs outgoing API requests so the server can check who sent them
//! independently of the bearer token.
//!
//! ## Envelope
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        REQUEST ENVELOPE                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  {                                                                      │
//! │    "userId": "u1",                  // Sender's account id              │
//! │    "auth":   "tok",                 // Bearer token                     │
//! │    "body":   "{}",                  // Request body, as sent            │
//! │    "sig":    "base64..."            // Signature (absent until signed)  │
//! │  }                                                                      │
//! │                                                                         │
//! │  Signed bytes:  userId ∥ auth ∥ body     (no separators)               │
//! │  Algorithm:     RSASSA-PKCS1-v1_5 / SHA-256, sender's private key       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Changing any of the three signed fields after signing makes
//! verification fail.

use serde::{Deserialize, Serialize};

use crate::crypto::asymmetric;
use crate::error::{Error, Result};

/// An API request with its sender signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    /// Sender's account id
    pub user_id: String,
    /// Bearer token
    pub auth: String,
    /// Request body
    pub body: String,
    /// Base64 signature over [`canonicalize`]
    #[serde(rename = "sig", default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl RequestEnvelope {
    /// Create an unsigned envelope
    pub fn new(
        user_id: impl Into<String>,
        auth: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            auth: auth.into(),
            body: body.into(),
            signature: None,
        }
    }

    /// Create an unsigned envelope whose body is `body` serialized as JSON
    pub fn with_json_body<T: Serialize>(
        user_id: impl Into<String>,
        auth: impl Into<String>,
        body: &T,
    ) -> Result<Self> {
        let body = serde_json::to_string(body)?;
        Ok(Self::new(user_id, auth, body))
    }

    /// Sign with the sender's private key, consuming and returning the envelope
    pub fn sign(self, private_key: &str) -> Self {
        sign(self, private_key)
    }

    /// Check the signature against the sender's public key
    pub fn verify(&self, public_key: &str) -> bool {
        verify(self, public_key)
    }

    /// Whether a signature is attached
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::SerializationError(e.to_string()))
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::DeserializationError(e.to_string()))
    }
}

/// The exact text that gets signed: `user_id ∥ auth ∥ body`
pub fn canonicalize(envelope: &RequestEnvelope) -> String {
    let mut canonical =
        String::with_capacity(envelope.user_id.len() + envelope.auth.len() + envelope.body.len());
    canonical.push_str(&envelope.user_id);
    canonical.push_str(&envelope.auth);
    canonical.push_str(&envelope.body);
    canonical
}

/// Attach a signature made with `private_key`
///
/// If no signature can be produced (public key, malformed key) the envelope
/// comes back with `signature: None` and a warning is logged.
pub fn sign(mut envelope: RequestEnvelope, private_key: &str) -> RequestEnvelope {
    let canonical = canonicalize(&envelope);
    envelope.signature = asymmetric::sign_base64(canonical.as_bytes(), private_key);

    if envelope.signature.is_none() {
        tracing::warn!("Request for user {} left unsigned", envelope.user_id);
    }

    envelope
}

/// Verify the envelope's signature with the sender's public key
///
/// An unsigned envelope never verifies.
pub fn verify(envelope: &RequestEnvelope, public_key: &str) -> bool {
    let Some(signature) = envelope.signature.as_deref() else {
        return false;
    };

    let canonical = canonicalize(envelope);
    asymmetric::verify_base64(canonical.as_bytes(), signature, public_key)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{alice, bob};

    #[test]
    fn test_signing_scenario() {
        let kp = alice();

        let mut envelope = RequestEnvelope::new("u1", "tok", "{}").sign(kp.private_key());
        assert!(envelope.is_signed());
        assert!(envelope.verify(kp.public_key()));

        envelope.body = r#"{"x":1}"#.to_string();
        assert!(!envelope.verify(kp.public_key()));
    }

    #[test]
    fn test_every_field_is_covered() {
        let kp = alice();
        let signed = sign(RequestEnvelope::new("u1", "tok", "{}"), kp.private_key());

        let mut changed_user = signed.clone();
        changed_user.user_id = "u2".into();
        let mut changed_auth = signed.clone();
        changed_auth.auth = "other".into();

        assert!(verify(&signed, kp.public_key()));
        assert!(!verify(&changed_user, kp.public_key()));
        assert!(!verify(&changed_auth, kp.public_key()));
    }

    #[test]
    fn test_canonical_form() {
        let envelope = RequestEnvelope::new("u1", "tok", "{}");
        assert_eq!(canonicalize(&envelope), "u1tok{}");
    }

    #[test]
    fn test_wrong_key_and_unsigned() {
        let signed = RequestEnvelope::new("u1", "tok", "{}").sign(alice().private_key());

        assert!(!signed.verify(bob().public_key()));
        assert!(!signed.verify(alice().private_key()));
        assert!(!RequestEnvelope::new("u1", "tok", "{}").verify(alice().public_key()));
    }

    #[test]
    fn test_sign_with_public_key_leaves_unsigned() {
        let envelope = RequestEnvelope::new("u1", "tok", "{}").sign(alice().public_key());
        assert!(!envelope.is_signed());
    }

    #[test]
    fn test_json_shape() {
        let unsigned = RequestEnvelope::new("u1", "tok", "{}");
        assert_eq!(
            unsigned.to_json().unwrap(),
            r#"{"userId":"u1","auth":"tok","body":"{}"}"#
        );

        let signed = unsigned.sign(alice().private_key());
        let json = signed.to_json().unwrap();
        assert!(json.contains(r#""sig":""#));

        let parsed = RequestEnvelope::from_json(&json).unwrap();
        assert_eq!(parsed, signed);
        assert!(parsed.verify(alice().public_key()));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            RequestEnvelope::from_json("{\"userId\":1}"),
            Err(Error::DeserializationError(_))
        ));
    }

    #[test]
    fn test_with_json_body() {
        #[derive(Serialize)]
        struct SendMessage<'a> {
            to: &'a str,
            text: &'a str,
        }

        let envelope = RequestEnvelope::with_json_body(
            "u1",
            "tok",
            &SendMessage { to: "u2", text: "hi" },
        )
        .unwrap();

        assert_eq!(envelope.body, r#"{"to":"u2","text":"hi"}"#);
        assert!(envelope.sign(bob().private_key()).verify(bob().public_key()));
    }
}
