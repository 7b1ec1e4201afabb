//! `versig PUBLIC_KEY SIGNATURE DATA` — print whether DATA matches.

use clap::Parser;
use filesig_cli::{init_tracing, versig, VerSigArgs};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();

    let args = VerSigArgs::parse();
    let verifies = versig(&args)?;

    println!("Signature verifies: {}", verifies);
    Ok(())
}
