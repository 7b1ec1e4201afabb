//! # Key/Signature Codec
//!
//! Byte forms of public keys and signatures as they are stored on disk.
//!
//! ## Public Key Formats
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DER (default): X.509 SubjectPublicKeyInfo, 44 bytes                    │
//! │                                                                         │
//! │    SEQUENCE {                                                           │
//! │      SEQUENCE { OID 1.3.101.112 (Ed25519) }                             │
//! │      BIT STRING { 32-byte public key }                                  │
//! │    }                                                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │  OpenSSH: one text line                                                 │
//! │                                                                         │
//! │    "ssh-ed25519" SP base64(blob) [SP comment]                           │
//! │    blob = u32be len ‖ "ssh-ed25519" ‖ u32be len ‖ 32-byte key           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Signatures have no framing: the file holds exactly the 64 bytes that
//! signing produced.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ed25519_dalek::pkcs8::{DecodePublicKey, EncodePublicKey};
use ed25519_dalek::VerifyingKey;

use crate::crypto::keys::PublicKey;
use crate::crypto::signing::Signature;
use crate::error::{Error, Result};

/// OpenSSH key type name for Ed25519
const SSH_ED25519: &str = "ssh-ed25519";

/// On-disk public key format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyFormat {
    /// X.509 SubjectPublicKeyInfo DER
    #[default]
    Der,
    /// OpenSSH `authorized_keys` line
    OpenSsh,
}

/// Encode a public key as SubjectPublicKeyInfo DER
///
/// Deterministic: the same key always yields the same bytes.
pub fn encode_public_key(key: &PublicKey) -> Result<Vec<u8>> {
    key.verifying_key()
        .to_public_key_der()
        .map(|doc| doc.as_bytes().to_vec())
        .map_err(|e| Error::SerializationError(e.to_string()))
}

/// Decode a SubjectPublicKeyInfo DER public key
///
/// Fails with [`Error::MalformedKey`] on truncated input, trailing data,
/// a non-Ed25519 algorithm identifier, or a point that does not decompress.
pub fn decode_public_key(bytes: &[u8]) -> Result<PublicKey> {
    VerifyingKey::from_public_key_der(bytes)
        .map(PublicKey::from_verifying_key)
        .map_err(|e| Error::MalformedKey(e.to_string()))
}

/// Encode a public key in the given format
pub fn encode_public_key_as(key: &PublicKey, format: KeyFormat) -> Result<Vec<u8>> {
    match format {
        KeyFormat::Der => encode_public_key(key),
        KeyFormat::OpenSsh => Ok(encode_openssh(key)),
    }
}

/// Decode a public key stored in the given format
pub fn decode_public_key_as(bytes: &[u8], format: KeyFormat) -> Result<PublicKey> {
    match format {
        KeyFormat::Der => decode_public_key(bytes),
        KeyFormat::OpenSsh => decode_openssh(bytes),
    }
}

/// Signature bytes as written to disk
pub fn encode_signature(signature: &Signature) -> Vec<u8> {
    signature.as_bytes().to_vec()
}

/// Signature from disk bytes. No validation happens here.
pub fn decode_signature(bytes: &[u8]) -> Signature {
    Signature::from_bytes(bytes)
}

// ============================================================================
// OPENSSH
// ============================================================================

fn encode_openssh(key: &PublicKey) -> Vec<u8> {
    let point = key.to_bytes();
    let mut blob = Vec::with_capacity(8 + SSH_ED25519.len() + point.len());
    put_string(&mut blob, SSH_ED25519.as_bytes());
    put_string(&mut blob, &point);

    format!("{} {}", SSH_ED25519, STANDARD.encode(blob)).into_bytes()
}

fn decode_openssh(bytes: &[u8]) -> Result<PublicKey> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| Error::MalformedKey("OpenSSH key is not UTF-8".into()))?;

    let mut fields = text.split_whitespace();
    let key_type = fields
        .next()
        .ok_or_else(|| Error::MalformedKey("empty OpenSSH key".into()))?;
    if key_type != SSH_ED25519 {
        return Err(Error::MalformedKey(format!(
            "unrecognized key type '{}'",
            key_type
        )));
    }
    // Anything after the blob is a comment.
    let encoded = fields
        .next()
        .ok_or_else(|| Error::MalformedKey("missing OpenSSH key blob".into()))?;

    let blob = STANDARD
        .decode(encoded)
        .map_err(|e| Error::MalformedKey(format!("invalid base64: {}", e)))?;

    let mut rest = blob.as_slice();
    let inner_type = take_string(&mut rest)?;
    if inner_type != SSH_ED25519.as_bytes() {
        return Err(Error::MalformedKey(
            "key blob type does not match 'ssh-ed25519'".into(),
        ));
    }
    let point = take_string(&mut rest)?;
    if !rest.is_empty() {
        return Err(Error::MalformedKey(format!(
            "{} trailing bytes in key blob",
            rest.len()
        )));
    }

    let point: [u8; 32] = point.try_into().map_err(|_| {
        Error::MalformedKey(format!("Ed25519 key must be 32 bytes, got {}", point.len()))
    })?;
    VerifyingKey::from_bytes(&point)
        .map(PublicKey::from_verifying_key)
        .map_err(|e| Error::MalformedKey(e.to_string()))
}

fn put_string(out: &mut Vec<u8>, value: &[u8]) {
    out.extend_from_slice(&(value.len() as u32).to_be_bytes());
    out.extend_from_slice(value);
}

fn take_string<'a>(input: &mut &'a [u8]) -> Result<&'a [u8]> {
    if input.len() < 4 {
        return Err(Error::MalformedKey("truncated length prefix".into()));
    }
    let (prefix, rest) = input.split_at(4);
    let len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
    if rest.len() < len {
        return Err(Error::MalformedKey(format!(
            "field claims {} bytes, {} remain",
            len,
            rest.len()
        )));
    }
    let (value, rest) = rest.split_at(len);
    *input = rest;
    Ok(value)
}

// ============================================================================
// TESTS
// ============================================================================
