/*!
Inspect command - display S-expression data in readable forms
*/

use super::io::{Input, Output};
use clap::Parser;
use csexp::decode::{Cursor, Kind};

/// Refuse pathological nesting rather than recurse without bound
const MAX_DEPTH: usize = 64;

/// Inspect and display canonical S-expression data
#[derive(Parser, Debug)]
#[command(about = "Inspect and display canonical S-expression data", long_about = None)]
pub struct Command {
    /// Output format
    #[arg(
        long,
        default_value = "text",
        value_name = "FORMAT",
        help = "Output format: text (human-readable), hex"
    )]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<Output>,

    /// Input file, canonical or transport encoded (use '-' for stdin)
    input: Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable tree (lossless for token atoms, hex otherwise)
    Text,
    /// Hexadecimal dump of the raw bytes
    Hex,
}

impl Command {
    pub fn exec(self) -> anyhow::Result<()> {
        let mut data = self.input.read_all()?;

        let output_text = match self.format {
            OutputFormat::Text => {
                let mut cursor = if data.first() == Some(&b'{') {
                    csexp::transport::first(&mut data)?
                } else {
                    Cursor::first(&data)?
                };
                format_tree(&mut cursor)?
            }
            OutputFormat::Hex => hex::encode(&data),
        };

        let output = self.output.unwrap_or(Output::Stdout);
        output.write_all(output_text.as_bytes())?;

        if matches!(output, Output::Stdout) {
            println!();
        }

        Ok(())
    }
}

fn format_tree(cursor: &mut Cursor) -> anyhow::Result<String> {
    let mut out = String::new();
    while cursor.kind() != Kind::End {
        if !out.is_empty() {
            out.push('\n');
        }
        write_expr(cursor, &mut out, 0)?;
    }
    Ok(out)
}

fn write_expr(cursor: &mut Cursor, out: &mut String, depth: usize) -> anyhow::Result<()> {
    match cursor.kind() {
        Kind::End => Ok(()),
        Kind::Atom => {
            if let Some(display) = cursor.display() {
                out.push('[');
                write_atom(display, out);
                out.push(']');
            }
            write_atom(cursor.atom()?, out);
            cursor.next()?;
            Ok(())
        }
        Kind::List => {
            if depth >= MAX_DEPTH {
                anyhow::bail!("nesting deeper than {MAX_DEPTH} levels");
            }
            cursor.enter_list()?;
            out.push('(');
            let mut first = true;
            while cursor.kind() != Kind::End {
                if !first {
                    out.push(' ');
                }
                first = false;
                write_expr(cursor, out, depth + 1)?;
            }
            cursor.exit_list()?;
            out.push(')');
            Ok(())
        }
    }
}

fn write_atom(bytes: &[u8], out: &mut String) {
    if is_token(bytes) {
        out.push_str(std::str::from_utf8(bytes).expect("token atoms are ASCII"));
    } else if !bytes.is_empty() && bytes.iter().all(|&b| b.is_ascii_graphic() || b == b' ') {
        out.push('"');
        for &b in bytes {
            if b == b'"' || b == b'\\' {
                out.push('\\');
            }
            out.push(b as char);
        }
        out.push('"');
    } else {
        out.push('#');
        out.push_str(&hex::encode(bytes));
        out.push('#');
    }
}

fn is_token(bytes: &[u8]) -> bool {
    !bytes.is_empty()
        && !bytes[0].is_ascii_digit()
        && bytes.iter().all(|&b| {
            b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'/' | b'_' | b'*' | b'+' | b'=')
        })
}
