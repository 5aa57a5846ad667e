/*!
Convert command - re-encode between canonical, transport and hex forms
*/

use super::io::{Input, Output};
use anyhow::Context;
use clap::Parser;
use csexp::{
    decode::{Cursor, Kind},
    encode::{Arg, Encoder},
    transport,
};

/// Convert S-expression data between encodings
#[derive(Parser, Debug)]
#[command(about = "Convert between canonical, transport and hex encodings", long_about = None)]
pub struct Command {
    /// Input form
    #[arg(
        long,
        default_value = "auto",
        value_name = "FORM",
        help = "Input form: auto (detect transport by leading '{'), canonical, transport, hex"
    )]
    from: InputFormat,

    /// Output form
    #[arg(long, default_value = "canonical", value_name = "FORM")]
    to: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<Output>,

    /// Input file (use '-' for stdin)
    input: Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum InputFormat {
    Auto,
    Canonical,
    Transport,
    Hex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Canonical,
    Transport,
    Hex,
}

impl Command {
    pub fn exec(self) -> anyhow::Result<()> {
        let mut data = self.input.read_all()?;

        let from = match self.from {
            InputFormat::Auto if data.first() == Some(&b'{') => InputFormat::Transport,
            InputFormat::Auto => InputFormat::Canonical,
            from => from,
        };

        let canonical = match from {
            InputFormat::Canonical => data,
            InputFormat::Transport => {
                let len = transport::decode_in_place(&mut data)?;
                data.truncate(len);
                data
            }
            InputFormat::Hex => {
                data.retain(|b| !b.is_ascii_whitespace());
                hex::decode(&data).context("input is not valid hex")?
            }
            InputFormat::Auto => unreachable!(),
        };

        // Refuse to emit bytes that do not parse
        let mut cursor =
            Cursor::first(&canonical).context("input is not a canonical S-expression")?;
        validate(&mut cursor).context("input is not a canonical S-expression")?;

        let converted = match self.to {
            OutputFormat::Canonical => canonical,
            OutputFormat::Transport => {
                let mut encoder = Encoder::new();
                transport::format(&mut encoder, "%l", &[Arg::Literal(&canonical)])?;
                encoder.build()
            }
            OutputFormat::Hex => hex::encode(&canonical).into_bytes(),
        };

        let output = self.output.unwrap_or(Output::Stdout);
        output.write_all(&converted)?;

        if matches!(output, Output::Stdout) {
            println!();
        }

        Ok(())
    }
}

fn validate(cursor: &mut Cursor) -> Result<(), csexp::decode::Error> {
    loop {
        match cursor.kind() {
            Kind::Atom => cursor.next()?,
            Kind::List => cursor.enter_list()?,
            Kind::End => {
                if cursor.level() == 0 {
                    return Ok(());
                }
                cursor.exit_list()?;
            }
        }
    }
}
