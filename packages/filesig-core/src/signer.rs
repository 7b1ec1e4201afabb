//! # Signer
//!
//! Generates a key pair, signs one file, and persists the signature and the
//! public key.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          SIGNER WORKFLOW                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Init ──► KeysGenerated ──► Signing ──► Signed                          │
//! │    │            │              │           │                            │
//! │    └────────────┴──────────────┴───────────┴──► Failed (Err)            │
//! │                                                                         │
//! │  1. KeyPair::generate(key_bits)                                         │
//! │  2. open file, pump chunks into SigningState                            │
//! │  3. finalize ──► Signature                                              │
//! │  4. stage both files, then rename signature and public key into place   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The private key lives only inside [`Signer::sign_file`] and is zeroized
//! when it returns. Output files are written to a temporary sibling and
//! renamed into place, so a failed write never leaves a partial file, and a
//! failed key write never leaves a new signature beside an old key.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::crypto::{
    begin_sign, encode_public_key_as, encode_signature, KeyFormat, KeyPair, PublicKey, Signature,
    KEY_BITS,
};
use crate::error::{Error, Result};
use crate::stream::{self, DEFAULT_CHUNK_SIZE};

/// Default signature output file
pub const DEFAULT_SIGNATURE_PATH: &str = "sig";

/// Default public key output file
pub const DEFAULT_PUBLIC_KEY_PATH: &str = "public_key";

/// Configuration for a [`Signer`]
#[derive(Debug, Clone)]
pub struct SignerConfig {
    /// Key size requested from key generation
    pub key_bits: usize,
    /// Read buffer size while digesting
    pub chunk_size: usize,
    /// Where the raw signature is written
    pub signature_path: PathBuf,
    /// Where the encoded public key is written
    pub public_key_path: PathBuf,
    /// Encoding of the public key file
    pub key_format: KeyFormat,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            key_bits: KEY_BITS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            signature_path: PathBuf::from(DEFAULT_SIGNATURE_PATH),
            public_key_path: PathBuf::from(DEFAULT_PUBLIC_KEY_PATH),
            key_format: KeyFormat::Der,
        }
    }
}

/// Result of a successful [`Signer::sign_file`]
#[derive(Debug, Clone)]
pub struct SignedFile {
    /// The signature that was written
    pub signature: Signature,
    /// Public half of the one-off key pair
    pub public_key: PublicKey,
    /// Where the signature went
    pub signature_path: PathBuf,
    /// Where the public key went
    pub public_key_path: PathBuf,
    /// Length of the signed content
    pub bytes_signed: u64,
}

/// Signs files with freshly generated keys
#[derive(Debug, Clone, Default)]
pub struct Signer {
    config: SignerConfig,
}

impl Signer {
    /// Create a signer with the given configuration
    pub fn new(config: SignerConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &SignerConfig {
        &self.config
    }

    /// Sign `path` with a new key pair and persist the signature and public key
    pub fn sign_file(&self, path: impl AsRef<Path>) -> Result<SignedFile> {
        let path = path.as_ref();

        let keys = KeyPair::generate(self.config.key_bits)?;
        tracing::debug!(
            "Keys generated for {} ({})",
            path.display(),
            keys.public_key().fingerprint()?
        );

        let file = File::open(path).map_err(|e| Error::file_access(path, e))?;
        let (signature, bytes_signed) = self.sign_source(&keys, file, path)?;
        tracing::debug!("Signed {} bytes of {}", bytes_signed, path.display());

        let encoded_key = encode_public_key_as(keys.public_key(), self.config.key_format)?;
        self.persist_pair(&encode_signature(&signature), &encoded_key)?;

        tracing::info!(
            "Saved signature to {} and public key to {}",
            self.config.signature_path.display(),
            self.config.public_key_path.display()
        );

        Ok(SignedFile {
            signature,
            public_key: *keys.public_key(),
            signature_path: self.config.signature_path.clone(),
            public_key_path: self.config.public_key_path.clone(),
            bytes_signed,
        })
    }

    /// Write the signature and key files as a pair
    ///
    /// Both files are staged before either is renamed into place. If the key
    /// rename still fails, the new signature is removed again so that no
    /// fresh `sig` is left beside a stale `public_key`.
    fn persist_pair(&self, signature: &[u8], public_key: &[u8]) -> Result<()> {
        let sig_path = &self.config.signature_path;
        let key_path = &self.config.public_key_path;

        let staged_sig = stage(sig_path, signature)?;
        let staged_key = stage(key_path, public_key)?;

        commit(staged_sig, sig_path)?;
        if let Err(e) = commit(staged_key, key_path) {
            if let Err(cleanup) = fs::remove_file(sig_path) {
                tracing::warn!(
                    "Could not remove {} after failed key write: {}",
                    sig_path.display(),
                    cleanup
                );
            }
            return Err(e);
        }
        Ok(())
    }

    /// Sign everything `reader` yields with an existing key pair
    pub fn sign_reader<R: Read>(&self, keys: &KeyPair, reader: R) -> Result<Signature> {
        self.sign_source(keys, reader, Path::new("<reader>"))
            .map(|(signature, _)| signature)
    }

    fn sign_source<R: Read>(
        &self,
        keys: &KeyPair,
        reader: R,
        source: &Path,
    ) -> Result<(Signature, u64)> {
        let mut state = begin_sign(keys.private_key())?;
        let bytes = stream::pump(reader, &mut state, self.config.chunk_size)
            .map_err(|e| Error::file_access(source, e))?;
        let signature = state.finalize()?;
        Ok((signature, bytes))
    }
}

/// Write `bytes` to a synced temporary sibling of `path`
fn stage(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::persistence(path, e))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| Error::persistence(path, e))?;

    tracing::debug!("Staged {} bytes for {}", bytes.len(), path.display());
    Ok(tmp)
}

/// Rename a staged file over `path`; `path` holds either the old content or
/// all of the new content
fn commit(tmp: NamedTempFile, path: &Path) -> Result<()> {
    tmp.persist(path)
        .map_err(|e| Error::persistence(path, e.error))?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
