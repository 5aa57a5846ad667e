/*!
sexp - a CLI for working with canonical S-expressions

This tool provides utilities for inspecting canonical S-expression data
(SPKI/Rivest style) and converting between the canonical, transport
(base64-bracketed) and hex representations.

# Commands

- `inspect`: display an S-expression in a human-readable form
- `convert`: re-encode between canonical, transport and hex forms

# Examples

```bash
# Pretty-print a key file (canonical or transport input auto-detected)
sexp inspect key.sexp

# Dump raw bytes as hex
sexp inspect --format hex key.sexp

# Wrap a canonical file for a text channel
sexp convert --to transport key.sexp -o key.tsexp

# Unwrap it again
sexp convert --to canonical key.tsexp | sexp inspect -
```
*/

use clap::{Parser, Subcommand};

mod convert;
mod inspect;
mod io;

/// A CLI tool for working with canonical S-expressions
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Tools for canonical S-expression data",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Inspect(inspect::Command),
    Convert(convert::Command),
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Commands::Inspect(cmd) => cmd.exec(),
        Commands::Convert(cmd) => cmd.exec(),
    }
}
