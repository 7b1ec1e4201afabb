//! # Digital Signatures Module
//!
//! Ed25519ph signatures over a streamed SHA-512 digest.
//!
//! ## Signature Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SIGNING FLOW                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  begin_sign(private) ──► SigningState { SHA-512, key }                 │
//! │                               │                                         │
//! │         chunk 1 ──► update ───┤                                         │
//! │         chunk 2 ──► update ───┤  (chunk boundaries do not matter)      │
//! │         chunk n ──► update ───┤                                         │
//! │                               ▼                                         │
//! │                    finalize() ──► Signature (64 bytes)                  │
//! │                                                                         │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                       VERIFICATION FLOW                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  begin_verify(public) ──► VerifyingState { SHA-512, key }              │
//! │         chunks ──► update                                               │
//! │                    finalize(&signature) ──► true / false                │
//! │                                                                         │
//! │  false  = signature does not match (normal outcome)                     │
//! │  Err(_) = signature bytes are not an Ed25519 signature at all           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both states are consumed by `finalize`, so a digest state can never be
//! reused for a second file.
//!
//! ## Why Ed25519ph?
//!
//! Plain Ed25519 hashes the message twice and therefore needs the whole
//! message in memory. The prehashed variant (RFC 8032 §5.1) signs a running
//! SHA-512 state, so files of any size are signed with one fixed buffer.

use ed25519_dalek::{Signature as Ed25519Signature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha512};

use crate::crypto::keys::{KeyPair, PrivateKey, PublicKey};
use crate::error::{Error, Result, Stage};

/// Size of an Ed25519 signature in bytes
pub const SIGNATURE_SIZE: usize = 64;

/// Raw signature bytes as produced by [`SigningState::finalize`]
///
/// Opaque to everything except the verifier. Constructing one from bytes
/// performs no validation; shape is checked only when verifying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    /// Wrap raw bytes
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the raw bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Encode as hex string
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Anything that accepts file content chunk by chunk
pub trait DigestSink {
    /// Feed the next chunk
    fn update(&mut self, chunk: &[u8]);
}

/// Generate a fresh key pair
///
/// Thin alias of [`KeyPair::generate`] so the engine exposes its three
/// entry points side by side.
pub fn generate_key_pair(key_bits: usize) -> Result<KeyPair> {
    KeyPair::generate(key_bits)
}

/// Bind a signing pass to `private_key`
pub fn begin_sign(private_key: &PrivateKey) -> Result<SigningState<'_>> {
    let key = private_key.signing_key();
    if key.verifying_key().is_weak() {
        return Err(Error::InvalidKey {
            stage: Stage::Signing,
            reason: "private key derives a small-order public point".into(),
        });
    }

    Ok(SigningState {
        digest: Sha512::new(),
        key,
        bytes: 0,
    })
}

/// Bind a verification pass to `public_key`
pub fn begin_verify(public_key: &PublicKey) -> Result<VerifyingState<'_>> {
    let key = public_key.verifying_key();
    if key.is_weak() {
        return Err(Error::InvalidKey {
            stage: Stage::Verifying,
            reason: "public key is a small-order point".into(),
        });
    }

    Ok(VerifyingState {
        digest: Sha512::new(),
        key,
        bytes: 0,
    })
}

/// In-progress digest bound to a private key
pub struct SigningState<'k> {
    digest: Sha512,
    key: &'k SigningKey,
    bytes: u64,
}

impl SigningState<'_> {
    /// Number of bytes fed so far
    pub fn bytes_digested(&self) -> u64 {
        self.bytes
    }

    /// Consume the state and produce the signature
    pub fn finalize(self) -> Result<Signature> {
        let check = self.digest.clone();
        let sig = self
            .key
            .sign_prehashed(self.digest, None)
            .map_err(|e| Error::SigningFailed(e.to_string()))?;

        // A signature the bound key cannot verify means the key material is bad.
        self.key
            .verifying_key()
            .verify_prehashed(check, None, &sig)
            .map_err(|_| {
                Error::SigningFailed("signature does not verify under the signing key".into())
            })?;

        tracing::debug!("Signed {} bytes", self.bytes);
        Ok(Signature(sig.to_bytes().to_vec()))
    }
}

impl DigestSink for SigningState<'_> {
    fn update(&mut self, chunk: &[u8]) {
        self.digest.update(chunk);
        self.bytes += chunk.len() as u64;
    }
}

/// In-progress digest bound to a public key
pub struct VerifyingState<'k> {
    digest: Sha512,
    key: &'k VerifyingKey,
    bytes: u64,
}

impl VerifyingState<'_> {
    /// Number of bytes fed so far
    pub fn bytes_digested(&self) -> u64 {
        self.bytes
    }

    /// Consume the state and check `signature` against the accumulated digest
    ///
    /// Returns `Ok(false)` for a well-formed signature that does not match.
    pub fn finalize(self, signature: &Signature) -> Result<bool> {
        let sig = Ed25519Signature::from_slice(signature.as_bytes()).map_err(|_| {
            Error::MalformedSignature(format!(
                "Signature must be {} bytes, got {}",
                SIGNATURE_SIZE,
                signature.as_bytes().len()
            ))
        })?;

        let valid = self
            .key
            .verify_prehashed(self.digest, None, &sig)
            .is_ok();
        tracing::debug!("Verified {} bytes: {}", self.bytes, valid);
        Ok(valid)
    }
}

impl DigestSink for VerifyingState<'_> {
    fn update(&mut self, chunk: &[u8]) {
        self.digest.update(chunk);
        self.bytes += chunk.len() as u64;
    }
}

// ============================================================================
// TESTS
// ============================================================================
