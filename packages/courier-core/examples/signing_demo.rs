//! # Request Signing Demo
//!
//! Demonstrates RSA signatures over API request envelopes.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example signing_demo
//! ```

use courier_core::crypto::{asymmetric, KeyPair};
use courier_core::request::{canonicalize, RequestEnvelope};

fn main() {
    println!("=== Courier Core: Request Signing Demo ===\n");

    // Step 1: Create a keypair
    println!("Step 1: Generating a 2048-bit RSA keypair...");

    let keypair = KeyPair::generate_with_bits(2048).expect("Failed to create keypair");
    println!("  Fingerprint: {}", keypair.fingerprint().expect("fingerprint"));
    println!();

    // Step 2: Explain the signing process
    println!("Step 2: Understanding request signatures");
    println!();
    println!("  ┌─────────────────────────────────────────────────────────────┐");
    println!("  │                   SIGNATURE FLOW                            │");
    println!("  ├─────────────────────────────────────────────────────────────┤");
    println!("  │                                                             │");
    println!("  │  SIGNING (client, private key):                            │");
    println!("  │                                                             │");
    println!("  │    userId ∥ auth ∥ body ──┐                                │");
    println!("  │                           ▼                                │");
    println!("  │    Private ─► PKCS#1 v1.5 / SHA-256 ─► sig (base64)        │");
    println!("  │                                                             │");
    println!("  │  VERIFICATION (server, public key from registration):      │");
    println!("  │                                                             │");
    println!("  │    userId ∥ auth ∥ body ──┐                                │");
    println!("  │                           ▼                                │");
    println!("  │    Public ──► PKCS#1 v1.5 / SHA-256 ─► Valid / Invalid     │");
    println!("  │    sig ───────────────────┘                                │");
    println!("  │                                                             │");
    println!("  │  A stolen bearer token alone cannot forge a request.       │");
    println!("  │                                                             │");
    println!("  └─────────────────────────────────────────────────────────────┘");
    println!();

    // Step 3: Sign a request
    println!("Step 3: Signing a request...");

    let envelope = RequestEnvelope::new("u1", "tok", "{}").sign(keypair.private_key());
    println!("  Canonical form: \"{}\"", canonicalize(&envelope));
    println!("  Envelope JSON:  {}...", &envelope.to_json().expect("json")[..64]);
    println!();

    // Step 4: Verify the signature
    println!("Step 4: Verifying the signature...");

    if envelope.verify(keypair.public_key()) {
        println!("  [OK] Signature is valid!");
    } else {
        println!("  [FAILED] Signature verification failed!");
    }
    println!();

    // Step 5: Forgery detection
    println!("Step 5: Forgery detection...");

    let mut tampered = envelope.clone();
    tampered.body = r#"{"x":1}"#.to_string();
    if tampered.verify(keypair.public_key()) {
        println!("  [FAILED] Tampered body was accepted!");
    } else {
        println!("  [OK] Tampered body detected - signature invalid!");
    }

    if envelope.verify(keypair.private_key()) {
        println!("  [FAILED] Private key was accepted as a verification key!");
    } else {
        println!("  [OK] Private key is not a verification key");
    }

    let other = KeyPair::generate_with_bits(2048).expect("Failed to create second keypair");
    if envelope.verify(other.public_key()) {
        println!("  [FAILED] Wrong public key was accepted!");
    } else {
        println!("  [OK] Wrong public key detected - signature invalid!");
    }
    println!();

    // Step 6: Raw signatures
    println!("Step 6: Signing multiple messages...");

    let messages = ["Send message", "Fetch inbox", "Update profile"];

    for (i, msg) in messages.iter().enumerate() {
        let sig = asymmetric::sign(msg.as_bytes(), keypair.private_key()).expect("sign");
        let valid = asymmetric::verify(msg.as_bytes(), &sig, keypair.public_key());
        println!("  Message {}: \"{}\"", i + 1, msg);
        println!("    Signature: {}...", hex::encode(&sig[..16]));
        println!("    Valid: {}", if valid { "[OK]" } else { "[FAILED]" });
    }
    println!();

    println!("=== Example Complete ===");
}
