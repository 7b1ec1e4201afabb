//! # Error Handling
//!
//! Error types for filesig.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Parameter & Key Errors                                            │
//! │  │   ├── UnsupportedParameter  - Key size not supported                │
//! │  │   └── InvalidKey            - Key unusable for sign/verify          │
//! │  │                                                                      │
//! │  ├── Codec Errors                                                      │
//! │  │   ├── MalformedKey          - Encoded public key unparseable        │
//! │  │   └── SerializationError    - Public key could not be encoded       │
//! │  │                                                                      │
//! │  ├── Signature Errors                                                  │
//! │  │   ├── SigningFailed         - Signature could not be produced       │
//! │  │   └── MalformedSignature    - Signature bytes have the wrong shape  │
//! │  │                                                                      │
//! │  └── File Errors                                                       │
//! │      ├── FileAccess            - Input file unreadable                 │
//! │      └── Persistence           - Output file could not be written      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A signature that does not match is *not* an error. Verification returns
//! `Ok(false)` for that case; `Err` is reserved for operations that could not
//! run to completion.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for filesig operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for filesig
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Parameter & Key Errors (100-199)
    // ========================================================================

    /// Requested security parameter is not supported by the algorithm
    #[error("Unsupported key size: {0}")]
    UnsupportedParameter(String),

    /// Key is malformed or cannot be used with this algorithm
    #[error("Invalid key for {stage}: {reason}")]
    InvalidKey {
        /// Signing or verifying, whichever bound the key
        stage: Stage,
        /// What is wrong with the key
        reason: String,
    },

    // ========================================================================
    // Codec Errors (200-299)
    // ========================================================================

    /// Encoded public key could not be decoded
    #[error("Malformed public key: {0}")]
    MalformedKey(String),

    /// Public key could not be encoded
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ========================================================================
    // Signature Errors (300-399)
    // ========================================================================

    /// Signing primitive refused to produce a signature
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Signature bytes are structurally unparseable
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    // ========================================================================
    // File Errors (400-499)
    // ========================================================================

    /// An input file could not be opened or read
    #[error("Cannot read {}: {source}", path.display())]
    FileAccess {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// An output file could not be written
    #[error("Cannot write {}: {source}", path.display())]
    Persistence {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// The step of a sign or verify flow at which an error surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Generating the key pair
    KeyGeneration,
    /// Encoding or decoding a public key
    KeyCodec,
    /// Binding a key or finalizing a signature
    Signing,
    /// Checking a signature
    Verifying,
    /// Reading an input file
    Reading,
    /// Writing an output file
    Persisting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::KeyGeneration => "key generation",
            Stage::KeyCodec => "key encoding",
            Stage::Signing => "signing",
            Stage::Verifying => "verification",
            Stage::Reading => "reading input",
            Stage::Persisting => "writing output",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 100-199: Parameters and keys
    /// - 200-299: Codec
    /// - 300-399: Signatures
    /// - 400-499: File I/O
    pub fn code(&self) -> i32 {
        match self {
            Error::UnsupportedParameter(_) => 100,
            Error::InvalidKey { .. } => 101,

            Error::MalformedKey(_) => 200,
            Error::SerializationError(_) => 201,

            Error::SigningFailed(_) => 300,
            Error::MalformedSignature(_) => 301,

            Error::FileAccess { .. } => 400,
            Error::Persistence { .. } => 401,
        }
    }

    /// Which step of the flow failed
    pub fn stage(&self) -> Stage {
        match self {
            Error::UnsupportedParameter(_) => Stage::KeyGeneration,
            Error::InvalidKey { stage, .. } => *stage,
            Error::SigningFailed(_) => Stage::Signing,
            Error::MalformedKey(_) | Error::SerializationError(_) => Stage::KeyCodec,
            Error::MalformedSignature(_) => Stage::Verifying,
            Error::FileAccess { .. } => Stage::Reading,
            Error::Persistence { .. } => Stage::Persisting,
        }
    }

    pub(crate) fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::FileAccess {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Persistence {
            path: path.into(),
            source,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
