//! `gensig FILE` — sign FILE with a new key pair, writing `sig` and `public_key`.

use clap::Parser;
use filesig_cli::{gensig, init_tracing, GenSigArgs};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let args = GenSigArgs::parse();
    let report = gensig(&args)?;

    println!("Generated and saved signature & public key");
    println!("  signature:  {}", report.signed.signature_path.display());
    println!("  public key: {}", report.signed.public_key_path.display());
    println!("  fingerprint: {}", report.fingerprint);
    Ok(())
}
