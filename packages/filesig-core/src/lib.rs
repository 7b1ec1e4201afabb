//! # filesig Core
//!
//! Sign a file with a one-off key pair, and later check that a file matches a
//! persisted signature and public key.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          FILESIG CORE                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   ┌──────────────┐                        ┌──────────────┐              │
//! │   │    Signer    │                        │   Verifier   │              │
//! │   │              │                        │              │              │
//! │   │ keygen       │                        │ load key     │              │
//! │   │ stream file  │                        │ load sig     │              │
//! │   │ persist      │                        │ stream file  │              │
//! │   └──────┬───────┘                        └──────┬───────┘              │
//! │          │                                       │                      │
//! │          ▼                                       ▼                      │
//! │   ┌─────────────────────────────────────────────────────────┐           │
//! │   │                        crypto                           │           │
//! │   │  ┌──────────────────────────┐  ┌─────────────────────┐  │           │
//! │   │  │ Engine (signing.rs)      │  │ Codec (codec.rs)    │  │           │
//! │   │  │ Ed25519ph over SHA-512   │  │ SPKI DER / OpenSSH  │  │           │
//! │   │  └──────────────────────────┘  └─────────────────────┘  │           │
//! │   └─────────────────────────────────────────────────────────┘           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use filesig_core::{Signer, Verifier};
//!
//! # fn main() -> filesig_core::Result<()> {
//! let signed = Signer::default().sign_file("hello.txt")?;
//! let ok = Verifier::default().verify_file(
//!     &signed.public_key_path,
//!     &signed.signature_path,
//!     "hello.txt",
//! )?;
//! assert!(ok);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod crypto;
pub mod error;
pub mod signer;
pub mod stream;
pub mod verifier;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use crypto::{KeyFormat, KeyPair, PublicKey, Signature};
pub use error::{Error, Result, Stage};
pub use signer::{SignedFile, Signer, SignerConfig};
pub use verifier::{Verifier, VerifierConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
