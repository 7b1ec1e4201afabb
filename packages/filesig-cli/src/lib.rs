//! Shared plumbing for the `gensig` and `versig` binaries.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::WrapErr;
use filesig_core::signer::{DEFAULT_PUBLIC_KEY_PATH, DEFAULT_SIGNATURE_PATH};
use filesig_core::{KeyFormat, SignedFile, Signer, SignerConfig, Verifier, VerifierConfig};
use tracing::info;

// ── CLI Arguments ─────────────────────────────────────────────────────────────

/// Public key file encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// X.509 SubjectPublicKeyInfo DER
    Der,
    /// OpenSSH `ssh-ed25519` line
    Openssh,
}

impl From<FormatArg> for KeyFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Der => KeyFormat::Der,
            FormatArg::Openssh => KeyFormat::OpenSsh,
        }
    }
}

/// Arguments for `gensig`
#[derive(Parser, Debug)]
#[command(name = "gensig", version, about = "Sign a file with a freshly generated key pair")]
pub struct GenSigArgs {
    /// File to sign
    pub file: PathBuf,

    /// Where to write the raw signature
    #[arg(long, default_value = DEFAULT_SIGNATURE_PATH)]
    pub signature_out: PathBuf,

    /// Where to write the public key
    #[arg(long, default_value = DEFAULT_PUBLIC_KEY_PATH)]
    pub public_key_out: PathBuf,

    /// Public key file encoding
    #[arg(long, value_enum, default_value_t = FormatArg::Der)]
    pub format: FormatArg,
}

impl GenSigArgs {
    /// Build the signer configuration
    pub fn config(&self) -> SignerConfig {
        SignerConfig {
            signature_path: self.signature_out.clone(),
            public_key_path: self.public_key_out.clone(),
            key_format: self.format.into(),
            ..SignerConfig::default()
        }
    }
}

/// Arguments for `versig`
#[derive(Parser, Debug)]
#[command(name = "versig", version, about = "Verify a file against a public key and signature")]
pub struct VerSigArgs {
    /// Public key file
    pub public_key: PathBuf,

    /// Signature file
    pub signature: PathBuf,

    /// File whose content was signed
    pub data: PathBuf,

    /// Public key file encoding
    #[arg(long, value_enum, default_value_t = FormatArg::Der)]
    pub format: FormatArg,
}

impl VerSigArgs {
    /// Build the verifier configuration
    pub fn config(&self) -> VerifierConfig {
        VerifierConfig {
            key_format: self.format.into(),
            ..VerifierConfig::default()
        }
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

/// Report produced by [`gensig`]
#[derive(Debug)]
pub struct GenSigReport {
    /// What the signer wrote
    pub signed: SignedFile,
    /// Hex SHA-256 of the public key
    pub fingerprint: String,
}

/// Sign `args.file`, wrapping any failure with the stage it happened at
pub fn gensig(args: &GenSigArgs) -> color_eyre::Result<GenSigReport> {
    info!("Signing {}", args.file.display());

    let signed = Signer::new(args.config())
        .sign_file(&args.file)
        .map_err(with_stage)
        .wrap_err_with(|| format!("could not sign {}", args.file.display()))?;
    let fingerprint = signed
        .public_key
        .fingerprint()
        .map_err(with_stage)
        .wrap_err("could not fingerprint the public key")?;

    info!(
        "Signed {} bytes of {} with key {}",
        signed.bytes_signed,
        args.file.display(),
        fingerprint
    );
    Ok(GenSigReport {
        signed,
        fingerprint,
    })
}

/// Verify `args.data`, wrapping any failure with the stage it happened at
pub fn versig(args: &VerSigArgs) -> color_eyre::Result<bool> {
    info!(
        "Verifying {} with key {} and signature {}",
        args.data.display(),
        args.public_key.display(),
        args.signature.display()
    );

    let verifies = Verifier::new(args.config())
        .verify_file(&args.public_key, &args.signature, &args.data)
        .map_err(with_stage)
        .wrap_err_with(|| format!("could not verify {}", args.data.display()))?;

    info!("Verdict for {}: {}", args.data.display(), verifies);
    Ok(verifies)
}

fn with_stage(e: filesig_core::Error) -> color_eyre::Report {
    let stage = e.stage();
    color_eyre::Report::new(e).wrap_err(format!("{} failed", stage))
}

// ── Logging ──────────────────────────────────────────────────────────────────

/// Log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "filesig_core=info,filesig_cli=info";

/// Install the stderr log subscriber, filtered by `RUST_LOG`
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn gensig_in(dir: &TempDir, content: &[u8]) -> GenSigArgs {
        let data = dir.path().join("data.txt");
        fs::write(&data, content).unwrap();
        GenSigArgs {
            file: data,
            signature_out: dir.path().join("sig"),
            public_key_out: dir.path().join("public_key"),
            format: FormatArg::Der,
        }
    }

    #[test]
    fn test_gensig_defaults() {
        let args = GenSigArgs::try_parse_from(["gensig", "data.txt"]).unwrap();
        let config = args.config();

        assert_eq!(args.file, PathBuf::from("data.txt"));
        assert_eq!(config.signature_path, PathBuf::from("sig"));
        assert_eq!(config.public_key_path, PathBuf::from("public_key"));
        assert_eq!(config.key_format, KeyFormat::Der);
    }

    #[test]
    fn test_gensig_overrides() {
        let args = GenSigArgs::try_parse_from([
            "gensig",
            "data.txt",
            "--signature-out",
            "out/data.sig",
            "--public-key-out",
            "out/data.pub",
            "--format",
            "openssh",
        ])
        .unwrap();
        let config = args.config();

        assert_eq!(config.signature_path, PathBuf::from("out/data.sig"));
        assert_eq!(config.public_key_path, PathBuf::from("out/data.pub"));
        assert_eq!(config.key_format, KeyFormat::OpenSsh);
    }

    #[test]
    fn test_gensig_requires_exactly_one_file() {
        assert!(GenSigArgs::try_parse_from(["gensig"]).is_err());
        assert!(GenSigArgs::try_parse_from(["gensig", "a", "b"]).is_err());
    }

    #[test]
    fn test_versig_requires_three_paths() {
        assert!(VerSigArgs::try_parse_from(["versig", "key", "sig"]).is_err());
        assert!(VerSigArgs::try_parse_from(["versig", "key", "sig", "data", "extra"]).is_err());

        let args = VerSigArgs::try_parse_from(["versig", "key", "sig", "data"]).unwrap();
        assert_eq!(args.public_key, PathBuf::from("key"));
        assert_eq!(args.signature, PathBuf::from("sig"));
        assert_eq!(args.data, PathBuf::from("data"));
        assert_eq!(args.config().key_format, KeyFormat::Der);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(VerSigArgs::try_parse_from(["versig", "k", "s", "d", "--format", "pem"]).is_err());
    }

    #[test]
    fn test_default_filter_covers_command_events() {
        // Command events are emitted from this module
        assert!(DEFAULT_LOG_FILTER
            .split(',')
            .any(|directive| directive == format!("{}=info", module_path!())));
        assert!(DEFAULT_LOG_FILTER.contains("filesig_core=info"));
    }

    #[test]
    fn test_gensig_then_versig() {
        let dir = TempDir::new().unwrap();
        let args = gensig_in(&dir, b"hello world");

        let report = gensig(&args).unwrap();
        assert_eq!(report.signed.bytes_signed, 11);
        assert_eq!(report.fingerprint, report.signed.public_key.fingerprint().unwrap());

        let check = VerSigArgs {
            public_key: args.public_key_out.clone(),
            signature: args.signature_out.clone(),
            data: args.file.clone(),
            format: FormatArg::Der,
        };
        assert!(versig(&check).unwrap());

        fs::write(&args.file, b"hello world!").unwrap();
        assert!(!versig(&check).unwrap());
    }

    #[test]
    fn test_errors_name_the_failed_stage() {
        let dir = TempDir::new().unwrap();
        let mut args = gensig_in(&dir, b"content");
        args.file = dir.path().join("absent.txt");

        let report = format!("{:?}", gensig(&args).unwrap_err());
        assert!(report.contains("reading input failed"));
        assert!(report.contains("absent.txt"));

        let check = VerSigArgs {
            public_key: dir.path().join("no_key"),
            signature: dir.path().join("no_sig"),
            data: dir.path().join("data.txt"),
            format: FormatArg::Der,
        };
        let report = format!("{:?}", versig(&check).unwrap_err());
        assert!(report.contains("could not verify"));
        assert!(report.contains("no_key"));
    }
}
