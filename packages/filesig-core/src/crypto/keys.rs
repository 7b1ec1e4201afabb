//! # Key Management
//!
//! Key-pair generation and the public/private key types.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY TYPES                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  KeyPair (Ed25519)                                                     │
//! │  ├── PrivateKey: 32 bytes, process memory only, zeroized on drop       │
//! │  └── PublicKey:  32 bytes, persisted as SubjectPublicKeyInfo DER       │
//! │                                                                         │
//! │  Both halves come out of one `KeyPair::generate` call. There is no     │
//! │  way to build a PrivateKey on its own, so a mismatched pair cannot     │
//! │  be assembled.                                                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::ZeroizeOnDrop;

use crate::crypto::codec;
use crate::error::{Error, Result};

/// Ed25519 key size in bits. The algorithm supports no other size.
pub const KEY_BITS: usize = 256;

/// Matched Ed25519 signing keypair
///
/// ## Security
///
/// - The private key is zeroized when this struct is dropped
/// - Nothing in this crate writes the private key anywhere
pub struct KeyPair {
    private: PrivateKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a new random keypair of `key_bits` bits
    ///
    /// Uses the operating system's secure random number generator.
    /// Fails with [`Error::UnsupportedParameter`] unless `key_bits` is
    /// [`KEY_BITS`].
    pub fn generate(key_bits: usize) -> Result<Self> {
        if key_bits < KEY_BITS {
            return Err(Error::UnsupportedParameter(format!(
                "{} bits is below the Ed25519 minimum of {} bits",
                key_bits, KEY_BITS
            )));
        }
        if key_bits != KEY_BITS {
            return Err(Error::UnsupportedParameter(format!(
                "Ed25519 keys are fixed at {} bits, got {}",
                KEY_BITS, key_bits
            )));
        }

        let secret = SigningKey::generate(&mut OsRng);
        let public = PublicKey::from_verifying_key(secret.verifying_key());
        tracing::debug!("Generated key pair {}", public.fingerprint()?);

        Ok(Self {
            private: PrivateKey { secret },
            public,
        })
    }

    /// The private half, for `begin_sign`
    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    /// The public half
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// Ed25519 private key
#[derive(ZeroizeOnDrop)]
pub struct PrivateKey {
    #[zeroize(skip)] // ed25519_dalek::SigningKey handles its own zeroization
    secret: SigningKey,
}

impl PrivateKey {
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.secret
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// Ed25519 public key
///
/// Immutable once generated or decoded. Two public keys compare equal when
/// they hold the same curve point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    key: VerifyingKey,
}

impl PublicKey {
    pub(crate) fn from_verifying_key(key: VerifyingKey) -> Self {
        Self { key }
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.key
    }

    /// Raw 32-byte compressed point
    pub fn to_bytes(&self) -> [u8; 32] {
        self.key.to_bytes()
    }

    /// Hex SHA-256 of the DER encoding, for display and logs
    ///
    /// Fails with [`Error::SerializationError`] exactly when
    /// [`encode_public_key`](crate::crypto::encode_public_key) would.
    pub fn fingerprint(&self) -> Result<String> {
        let der = codec::encode_public_key(self)?;
        Ok(hex::encode(Sha256::digest(der)))
    }
}

// ============================================================================
// TESTS
// ============================================================================
