//! # Key Custody Demo
//!
//! Demonstrates storing a private key on an untrusted server.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example custody_demo
//! ```

use courier_core::{CryptoConfig, CryptoCore, UserPassword};

fn main() {
    println!("=== Courier Core: Key Custody Demo ===\n");

    let core = CryptoCore::new(CryptoConfig {
        rsa_key_bits: 2048,
        ..Default::default()
    })
    .expect("Failed to build core");

    // Step 1: Registration
    println!("Step 1: Registration - generate and wrap a keypair...");

    let keypair = core.generate_keypair().expect("Failed to generate keypair");
    let password = UserPassword::new("Tr0ub4dor&3");

    let stored = core
        .custody()
        .wrap_keypair(&keypair, &password)
        .expect("Failed to wrap keypair");

    println!("  Fingerprint:          {}", keypair.fingerprint().expect("fingerprint"));
    println!("  Wrapped public key:   {} chars", stored.public_key.len());
    println!("  Wrapped private key:  {} chars", stored.private_key.len());
    println!(
        "  Server sees:          {}...",
        &serde_json::to_string(&stored).expect("json")[..60]
    );
    println!();

    // Step 2: Login
    println!("Step 2: Login - unwrap with the raw password...");

    match core.custody().unwrap_keypair(&stored, &password) {
        Some(restored) if restored.private_key() == keypair.private_key() => {
            println!("  [OK] Private key restored");
        }
        _ => println!("  [FAILED] Could not restore the keypair"),
    }

    match core
        .custody()
        .unwrap_keypair(&stored, &UserPassword::new("wrong-pw"))
    {
        None => println!("  [OK] Wrong password rejected"),
        Some(_) => println!("  [FAILED] Wrong password was accepted!"),
    }
    println!();

    // Step 3: Password change
    println!("Step 3: Password change - rewrap under the new password...");

    let new_password = UserPassword::new("correct horse battery staple");
    let rewrapped = core
        .custody()
        .rewrap_private_key(&stored.private_key, &password, &new_password)
        .expect("Failed to rewrap");

    let opened_new = core.custody().unwrap_private_key(&rewrapped, &new_password);
    let opened_old = core.custody().unwrap_private_key(&rewrapped, &password);

    println!(
        "  New password opens it: {}",
        if opened_new.is_some() { "[OK]" } else { "[FAILED]" }
    );
    println!(
        "  Old password rejected: {}",
        if opened_old.is_none() { "[OK]" } else { "[FAILED]" }
    );
    println!();

    println!("=== Example Complete ===");
}
