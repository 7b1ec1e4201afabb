//! # Sign and Verify Demo
//!
//! Signs a small file, verifies it, then shows that a one-byte change is
//! detected.
//!
//! ## Run
//!
//! ```bash
//! cargo run --example sign_and_verify
//! ```

use std::fs;

use filesig_core::{Signer, SignerConfig, Verifier};

fn main() -> filesig_core::Result<()> {
    println!("=== filesig: Sign and Verify Demo ===\n");

    let dir = tempfile::tempdir().map_err(|e| filesig_core::Error::Persistence {
        path: std::env::temp_dir(),
        source: e,
    })?;
    let data = dir.path().join("hello.txt");
    fs::write(&data, b"hello world").map_err(|e| filesig_core::Error::Persistence {
        path: data.clone(),
        source: e,
    })?;

    // Step 1: Sign
    println!("Step 1: Signing {}...", data.display());
    let signer = Signer::new(SignerConfig {
        signature_path: dir.path().join("sig"),
        public_key_path: dir.path().join("public_key"),
        ..SignerConfig::default()
    });
    let signed = signer.sign_file(&data)?;
    println!("  Public key fingerprint: {}", signed.public_key.fingerprint()?);
    println!("  Signature (hex): {}", signed.signature.to_hex());
    println!();

    // Step 2: Verify the untouched file
    println!("Step 2: Verifying the original file...");
    let verifier = Verifier::default();
    let ok = verifier.verify_file(&signed.public_key_path, &signed.signature_path, &data)?;
    println!("  Signature verifies: {}", ok);
    println!();

    // Step 3: Tamper and verify again
    println!("Step 3: Appending one byte and verifying again...");
    fs::write(&data, b"hello world!").map_err(|e| filesig_core::Error::Persistence {
        path: data.clone(),
        source: e,
    })?;
    let ok = verifier.verify_file(&signed.public_key_path, &signed.signature_path, &data)?;
    println!("  Signature verifies: {}", ok);

    println!("\n=== Demo Complete ===");
    Ok(())
}
