//! # Cryptography Module
//!
//! The digest/signature engine and the codec for its persisted byte forms.
//!
//! ## Algorithm Choices & Rationale
//!
//! | Algorithm | Purpose | Why Chosen |
//! |-----------|---------|------------|
//! | Ed25519ph | Signing | Deterministic, 64-byte signatures, signs a streamed prehash |
//! | SHA-512 | Message digest | Required by Ed25519ph, collision resistant |
//! | SubjectPublicKeyInfo DER | Public key file | Self-describing: algorithm OID + key value |
//! | SHA-256 | Key fingerprint | Short stable identifier for display |
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: The private key is zeroized when dropped
//! 2. **Constant-Time Operations**: Using dalek for constant-time crypto
//! 3. **Secure Random**: Using `rand::rngs::OsRng` for key generation
//! 4. **Single Use**: Digest states are consumed by `finalize`

mod codec;
mod keys;
mod signing;

pub use codec::{
    decode_public_key, decode_public_key_as, decode_signature, encode_public_key,
    encode_public_key_as, encode_signature, KeyFormat,
};
pub use keys::{KeyPair, PrivateKey, PublicKey, KEY_BITS};
pub use signing::{
    begin_sign, begin_verify, generate_key_pair, DigestSink, Signature, SigningState,
    VerifyingState, SIGNATURE_SIZE,
};
