//! # Verifier
//!
//! Checks a data file against a persisted public key and signature.
//!
//! ```text
//! Init ──► KeyLoaded ──► SignatureLoaded ──► Verifying ──► Verified(bool)
//!   └──────────┴───────────────┴─────────────────┴──────► Failed (Err)
//! ```
//!
//! `Ok(false)` means the check ran and the signature does not match: the
//! file, key or signature was changed. `Err` means the check could not run.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::crypto::{
    begin_verify, decode_public_key_as, decode_signature, KeyFormat, PublicKey, Signature,
};
use crate::error::{Error, Result};
use crate::stream::{self, DEFAULT_CHUNK_SIZE};

/// Largest public key file accepted; an OpenSSH line with a long comment
/// fits comfortably
pub const MAX_PUBLIC_KEY_FILE_SIZE: u64 = 16 * 1024;

/// Largest signature file accepted
pub const MAX_SIGNATURE_FILE_SIZE: u64 = 1024;

/// Configuration for a [`Verifier`]
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Read buffer size while digesting
    pub chunk_size: usize,
    /// Encoding of the public key file
    pub key_format: KeyFormat,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            key_format: KeyFormat::Der,
        }
    }
}

/// Verifies files against persisted keys and signatures
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: VerifierConfig,
}

impl Verifier {
    /// Create a verifier with the given configuration
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify `data_path` against the key and signature stored in files
    pub fn verify_file(
        &self,
        public_key_path: impl AsRef<Path>,
        signature_path: impl AsRef<Path>,
        data_path: impl AsRef<Path>,
    ) -> Result<bool> {
        let public_key = self.load_public_key(public_key_path)?;
        tracing::debug!("Key loaded ({})", public_key.fingerprint()?);

        let signature = self.load_signature(signature_path)?;
        tracing::debug!("Signature loaded ({} bytes)", signature.as_bytes().len());

        let data_path = data_path.as_ref();
        let file = File::open(data_path).map_err(|e| Error::file_access(data_path, e))?;
        let valid = self.verify_source(&public_key, &signature, file, data_path)?;

        if valid {
            tracing::info!("Signature verifies for {}", data_path.display());
        } else {
            tracing::warn!("Signature does not verify for {}", data_path.display());
        }
        Ok(valid)
    }

    /// Read and decode a public key file
    ///
    /// Files larger than [`MAX_PUBLIC_KEY_FILE_SIZE`] are rejected as
    /// [`Error::MalformedKey`] without being read in full.
    pub fn load_public_key(&self, path: impl AsRef<Path>) -> Result<PublicKey> {
        let path = path.as_ref();
        let bytes = read_bounded(path, MAX_PUBLIC_KEY_FILE_SIZE)?.ok_or_else(|| {
            Error::MalformedKey(format!(
                "{} is larger than {} bytes",
                path.display(),
                MAX_PUBLIC_KEY_FILE_SIZE
            ))
        })?;
        decode_public_key_as(&bytes, self.config.key_format)
    }

    /// Read a signature file
    ///
    /// Files larger than [`MAX_SIGNATURE_FILE_SIZE`] are rejected as
    /// [`Error::MalformedSignature`] without being read in full.
    pub fn load_signature(&self, path: impl AsRef<Path>) -> Result<Signature> {
        let path = path.as_ref();
        let bytes = read_bounded(path, MAX_SIGNATURE_FILE_SIZE)?.ok_or_else(|| {
            Error::MalformedSignature(format!(
                "{} is larger than {} bytes",
                path.display(),
                MAX_SIGNATURE_FILE_SIZE
            ))
        })?;
        Ok(decode_signature(&bytes))
    }

    /// Verify everything `reader` yields against an in-memory key and signature
    pub fn verify_reader<R: Read>(
        &self,
        public_key: &PublicKey,
        signature: &Signature,
        reader: R,
    ) -> Result<bool> {
        self.verify_source(public_key, signature, reader, Path::new("<reader>"))
    }

    fn verify_source<R: Read>(
        &self,
        public_key: &PublicKey,
        signature: &Signature,
        reader: R,
        source: &Path,
    ) -> Result<bool> {
        let mut state = begin_verify(public_key)?;
        stream::pump(reader, &mut state, self.config.chunk_size)
            .map_err(|e| Error::file_access(source, e))?;
        state.finalize(signature)
    }
}

/// Drain `path` to end of stream, or `None` if it holds more than `limit` bytes
fn read_bounded(path: &Path, limit: u64) -> Result<Option<Vec<u8>>> {
    let file = File::open(path).map_err(|e| Error::file_access(path, e))?;
    let mut bytes = Vec::new();
    file.take(limit + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| Error::file_access(path, e))?;

    if bytes.len() as u64 > limit {
        return Ok(None);
    }
    Ok(Some(bytes))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{encode_public_key, KeyPair, KEY_BITS};
    use crate::error::Stage;
    use crate::signer::{Signer, SignerConfig};
    use std::fs;
    use std::path::PathBuf;

    /// SubjectPublicKeyInfo DER of the Ed25519 identity point, a small-order key
    fn identity_point_der() -> Vec<u8> {
        let mut der = vec![
            0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
        ];
        der.push(0x01);
        der.extend_from_slice(&[0u8; 31]);
        der
    }
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        data: PathBuf,
        sig: PathBuf,
        key: PathBuf,
    }

    fn signed(content: &[u8]) -> Fixture {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("hello.txt");
        let sig = dir.path().join("sig");
        let key = dir.path().join("public_key");
        fs::write(&data, content).unwrap();

        Signer::new(SignerConfig {
            signature_path: sig.clone(),
            public_key_path: key.clone(),
            ..SignerConfig::default()
        })
        .sign_file(&data)
        .unwrap();

        Fixture {
            dir,
            data,
            sig,
            key,
        }
    }

    #[test]
    fn test_hello_world_scenario() {
        let fx = signed(b"hello world");
        let verifier = Verifier::default();

        assert!(verifier.verify_file(&fx.key, &fx.sig, &fx.data).unwrap());

        let extended = fx.dir.path().join("hello2.txt");
        fs::write(&extended, b"hello world!").unwrap();
        assert!(!verifier.verify_file(&fx.key, &fx.sig, &extended).unwrap());

        let other = KeyPair::generate(KEY_BITS).unwrap();
        let other_key = fx.dir.path().join("other_key");
        fs::write(&other_key, encode_public_key(other.public_key()).unwrap()).unwrap();
        assert!(!verifier.verify_file(&other_key, &fx.sig, &fx.data).unwrap());
    }

    #[test]
    fn test_any_flipped_data_byte_fails() {
        let content = b"The quick brown fox jumps over the lazy dog";
        let fx = signed(content);
        let verifier = Verifier::default();

        for i in 0..content.len() {
            let mut tampered = content.to_vec();
            tampered[i] ^= 0x80;
            fs::write(&fx.data, &tampered).unwrap();
            assert!(
                !verifier.verify_file(&fx.key, &fx.sig, &fx.data).unwrap(),
                "flip at {} verified",
                i
            );
        }
    }

    #[test]
    fn test_any_flipped_signature_byte_fails() {
        let fx = signed(b"payload");
        let original = fs::read(&fx.sig).unwrap();
        let verifier = Verifier::default();

        for i in 0..original.len() {
            let mut tampered = original.clone();
            tampered[i] ^= 0x01;
            fs::write(&fx.sig, &tampered).unwrap();
            assert!(!verifier.verify_file(&fx.key, &fx.sig, &fx.data).unwrap());
        }
    }

    #[test]
    fn test_flipped_public_key_byte_fails_or_is_malformed() {
        let fx = signed(b"payload");
        let original = fs::read(&fx.key).unwrap();
        let verifier = Verifier::default();

        // Only the key value (after the 12-byte SPKI header) is flipped; a
        // flipped point either fails to decompress or verifies as false.
        for i in 12..original.len() {
            let mut tampered = original.clone();
            tampered[i] ^= 0x01;
            fs::write(&fx.key, &tampered).unwrap();
            match verifier.verify_file(&fx.key, &fx.sig, &fx.data) {
                Ok(valid) => assert!(!valid, "flip at {} verified", i),
                Err(e) => assert!(matches!(e, Error::MalformedKey(_) | Error::InvalidKey { .. })),
            }
        }
    }

    #[test]
    fn test_truncated_signature_is_malformed() {
        let fx = signed(b"payload");
        let original = fs::read(&fx.sig).unwrap();
        fs::write(&fx.sig, &original[..63]).unwrap();

        let err = Verifier::default()
            .verify_file(&fx.key, &fx.sig, &fx.data)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedSignature(_)));
    }

    #[test]
    fn test_garbage_key_file_is_malformed() {
        let fx = signed(b"payload");
        fs::write(&fx.key, b"definitely not a key").unwrap();

        let err = Verifier::default()
            .verify_file(&fx.key, &fx.sig, &fx.data)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedKey(_)));
    }

    #[test]
    fn test_small_order_key_file_fails_at_verification() {
        let fx = signed(b"payload");
        fs::write(&fx.key, identity_point_der()).unwrap();

        let err = Verifier::default()
            .verify_file(&fx.key, &fx.sig, &fx.data)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidKey {
                stage: Stage::Verifying,
                ..
            }
        ));
        assert_eq!(err.stage(), Stage::Verifying);
        assert_eq!(err.code(), 101);
        assert!(err.to_string().contains("verification"));
    }

    #[test]
    fn test_oversized_key_file_is_malformed() {
        let fx = signed(b"payload");
        let mut huge = fs::read(&fx.key).unwrap();
        huge.resize(MAX_PUBLIC_KEY_FILE_SIZE as usize + 1, 0);
        fs::write(&fx.key, &huge).unwrap();

        let err = Verifier::default()
            .verify_file(&fx.key, &fx.sig, &fx.data)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedKey(_)));
        assert!(err.to_string().contains("larger than"));
    }

    #[test]
    fn test_oversized_signature_file_is_malformed() {
        let fx = signed(b"payload");
        fs::write(&fx.sig, vec![0u8; MAX_SIGNATURE_FILE_SIZE as usize + 1]).unwrap();

        let err = Verifier::default()
            .verify_file(&fx.key, &fx.sig, &fx.data)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedSignature(_)));
        assert!(err.to_string().contains("larger than"));
    }

    #[test]
    fn test_files_at_the_size_limit_are_read() {
        let fx = signed(b"payload");
        let verifier = Verifier::default();

        fs::write(&fx.sig, vec![0u8; MAX_SIGNATURE_FILE_SIZE as usize]).unwrap();
        let sig = verifier.load_signature(&fx.sig).unwrap();
        assert_eq!(sig.as_bytes().len() as u64, MAX_SIGNATURE_FILE_SIZE);

        // Right size, wrong shape: rejected by verification, not by the size cap
        assert!(matches!(
            verifier.verify_file(&fx.key, &fx.sig, &fx.data),
            Err(Error::MalformedSignature(msg)) if !msg.contains("larger than")
        ));
    }

    #[test]
    fn test_missing_files_are_file_access_errors() {
        let fx = signed(b"payload");
        let missing = fx.dir.path().join("nope");
        let verifier = Verifier::default();

        for (key, sig, data) in [
            (&missing, &fx.sig, &fx.data),
            (&fx.key, &missing, &fx.data),
            (&fx.key, &fx.sig, &missing),
        ] {
            let err = verifier.verify_file(key, sig, data).unwrap_err();
            assert!(matches!(err, Error::FileAccess { .. }));
            assert!(err.to_string().contains("nope"));
        }
    }

    #[test]
    fn test_openssh_key_files() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        fs::write(&data, b"ssh formatted").unwrap();
        let signed = Signer::new(SignerConfig {
            signature_path: dir.path().join("sig"),
            public_key_path: dir.path().join("key.pub"),
            key_format: KeyFormat::OpenSsh,
            ..SignerConfig::default()
        })
        .sign_file(&data)
        .unwrap();

        let ssh = Verifier::new(VerifierConfig {
            key_format: KeyFormat::OpenSsh,
            ..VerifierConfig::default()
        });
        assert!(ssh
            .verify_file(&signed.public_key_path, &signed.signature_path, &data)
            .unwrap());

        // Reading an OpenSSH file as DER is a decoding error, not a false verdict
        assert!(matches!(
            Verifier::default().verify_file(&signed.public_key_path, &signed.signature_path, &data),
            Err(Error::MalformedKey(_))
        ));
    }

    #[test]
    fn test_large_file_small_chunks() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("big.bin");
        let content: Vec<u8> = (0..300_000u32).map(|i| (i * 7 % 256) as u8).collect();
        fs::write(&data, &content).unwrap();

        let signed = Signer::new(SignerConfig {
            signature_path: dir.path().join("sig"),
            public_key_path: dir.path().join("public_key"),
            chunk_size: 1000,
            ..SignerConfig::default()
        })
        .sign_file(&data)
        .unwrap();
        assert_eq!(signed.bytes_signed, 300_000);

        let verifier = Verifier::new(VerifierConfig {
            chunk_size: 4096,
            ..VerifierConfig::default()
        });
        assert!(verifier
            .verify_file(&signed.public_key_path, &signed.signature_path, &data)
            .unwrap());
    }

    #[test]
    fn test_verify_reader() {
        let keys = KeyPair::generate(KEY_BITS).unwrap();
        let sig = Signer::default().sign_reader(&keys, &b"in memory"[..]).unwrap();
        let verifier = Verifier::default();

        assert!(verifier
            .verify_reader(keys.public_key(), &sig, &b"in memory"[..])
            .unwrap());
        assert!(!verifier
            .verify_reader(keys.public_key(), &sig, &b"in memory."[..])
            .unwrap());
    }
}
