//! # Encryption Demo
//!
//! Demonstrates hybrid end-to-end message encryption between two parties.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example encryption_demo
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use courier_core::compression::default_codec;
use courier_core::crypto::KeyPair;
use courier_core::messaging::{HybridPayload, MessageCipher};

fn main() {
    println!("=== Courier Core: Hybrid Encryption Demo ===\n");

    // Step 1: Create keypairs for Alice and Bob
    println!("Step 1: Generating 2048-bit RSA keypairs for Alice and Bob...");

    let alice = KeyPair::generate_with_bits(2048).expect("Failed to create Alice's keypair");
    let bob = KeyPair::generate_with_bits(2048).expect("Failed to create Bob's keypair");

    println!(
        "  Alice's key fingerprint: {}",
        alice.fingerprint().expect("fingerprint")
    );
    println!(
        "  Bob's key fingerprint:   {}",
        bob.fingerprint().expect("fingerprint")
    );
    println!();

    // Step 2: Explain the scheme
    println!("Step 2: Understanding the hybrid scheme");
    println!();
    println!("  ┌─────────────────────────────────────────────────────────────┐");
    println!("  │                    HYBRID ENCRYPTION                        │");
    println!("  ├─────────────────────────────────────────────────────────────┤");
    println!("  │                                                             │");
    println!("  │   plaintext ──► AES-256-GCM (one-time key K, IV)           │");
    println!("  │                        │                                    │");
    println!("  │   K ──► RSA-OAEP (Bob's public key)                        │");
    println!("  │                        │                                    │");
    println!("  │   b64(RSA(K)) | b64(IV) | b64(ciphertext)                  │");
    println!("  │                        │                                    │");
    println!("  │                    compress ──► base64 ──► wire             │");
    println!("  │                                                             │");
    println!("  └─────────────────────────────────────────────────────────────┘");
    println!();

    let cipher = MessageCipher::new(default_codec());

    // Step 3: Alice encrypts a message for Bob
    println!("Step 3: Alice encrypts a message for Bob...");

    let message = r#"{"text":"Hello Bob! This is a secret message from Alice."}"#;
    println!("  Plaintext: {}", message);

    let packed = cipher
        .encrypt_message(message, bob.public_key())
        .expect("Encryption failed");

    println!("  Packed ({} chars): {}...", packed.len(), &packed[..48]);

    let joined = cipher.codec().decompress(&packed).expect("decompress");
    let payload = HybridPayload::unpack(&joined).expect("unpack");
    println!("  Wrapped key: {} bytes", payload.encrypted_key.len());
    println!("  IV:          {}", hex::encode(&payload.iv));
    println!("  Ciphertext:  {} bytes", payload.ciphertext.len());
    println!();

    // Step 4: Bob decrypts
    println!("Step 4: Bob decrypts the message...");

    match cipher.decrypt_message(&packed, bob.private_key()) {
        Ok(Some(text)) if text == message => {
            println!("  Decrypted: {}", text);
            println!("  [OK] Message decrypted successfully!");
        }
        other => println!("  [FAILED] Unexpected result: {:?}", other),
    }
    println!();

    // Step 5: Alice cannot read what she sent to Bob
    println!("Step 5: Wrong recipient...");

    match cipher.decrypt_message(&packed, alice.private_key()) {
        Ok(None) => println!("  [OK] Alice's key cannot open Bob's message"),
        other => println!("  [FAILED] Unexpected result: {:?}", other),
    }
    println!();

    // Step 6: Tamper detection
    println!("Step 6: Tamper detection...");

    let mut raw = BASE64.decode(&packed).expect("base64");
    let middle = raw.len() / 2;
    raw[middle] ^= 0x01;
    let tampered = BASE64.encode(raw);

    match cipher.decrypt_message(&tampered, bob.private_key()) {
        Ok(None) => println!("  [OK] Tampered message detected and rejected!"),
        other => println!("  [FAILED] Tampered message was accepted: {:?}", other),
    }

    // Step 7: Misuse is an error, not a soft failure
    match cipher.decrypt_message(&packed, bob.public_key()) {
        Err(e) => println!("  [OK] Public key rejected: {} (code {})", e, e.code()),
        Ok(_) => println!("  [FAILED] Public key was accepted for decryption!"),
    }
    println!();

    println!("=== Example Complete ===");
}
