use alloc::vec::Vec;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Unbalanced parenthesis in format template")]
    UnbalancedParens,

    #[error("Unknown format specifier '%{0}'")]
    UnknownSpecifier(char),

    #[error("Unexpected character {0:?} in format template")]
    BadFormat(char),

    #[error("Too few arguments for format template")]
    TooFewArguments,

    #[error("Too many arguments for format template")]
    TooManyArguments,

    #[error("Argument does not match its format specifier")]
    ArgumentMismatch,

    #[error("Output buffer growth failed")]
    OutOfMemory,
}

/// One formatting argument, consumed by exactly one template specifier.
#[derive(Debug, Clone, Copy)]
pub enum Arg<'a> {
    /// `%s`: a byte string, emitted as `<len>:<bytes>`.
    Bytes(&'a [u8]),

    /// `%z`: a text string, emitted as `<len>:<bytes>` of its UTF-8 form.
    Str(&'a str),

    /// `%i`: a small non-negative integer, emitted as the length-prefixed
    /// minimal big-endian encoding of its value.
    UInt(u32),

    /// `%b`: an arbitrary-precision non-negative integer, given as its
    /// big-endian magnitude. Leading zero bytes are stripped before
    /// emission; zero emits as the empty atom.
    Natural(&'a [u8]),

    /// `%l`: pre-encoded bytes spliced verbatim with no length prefix,
    /// typically a balanced sub-expression from an earlier formatting call.
    Literal(&'a [u8]),
}

/// An append-only growable output buffer.
pub struct Encoder {
    data: Vec<u8>,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn offset(&self) -> usize {
        self.data.len()
    }

    pub fn push(&mut self, byte: u8) -> Result<(), Error> {
        self.data.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
        self.data.push(byte);
        Ok(())
    }

    pub fn append(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.data
            .try_reserve(bytes.len())
            .map_err(|_| Error::OutOfMemory)?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }
}

/* Counts everything it is asked to emit, and writes only when a real
 * encoder is attached. One code path serves both passes. */
struct Output<'a> {
    encoder: Option<&'a mut Encoder>,
    written: usize,
}

impl Output<'_> {
    fn put_byte(&mut self, byte: u8) -> Result<(), Error> {
        if let Some(encoder) = &mut self.encoder {
            encoder.push(byte)?;
        }
        self.written += 1;
        Ok(())
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if let Some(encoder) = &mut self.encoder {
            encoder.append(bytes)?;
        }
        self.written += bytes.len();
        Ok(())
    }

    fn put_length(&mut self, mut len: usize) -> Result<(), Error> {
        let mut digits = [0u8; 20];
        let mut i = digits.len();
        loop {
            i -= 1;
            digits[i] = b'0' + (len % 10) as u8;
            len /= 10;
            if len == 0 {
                break;
            }
        }
        self.put(&digits[i..])
    }

    fn put_netstring(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.put_length(bytes.len())?;
        self.put_byte(b':')?;
        self.put(bytes)
    }
}

fn strip_leading_zeros(magnitude: &[u8]) -> &[u8] {
    let i = magnitude
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(magnitude.len());
    &magnitude[i..]
}

/// Interprets `format` against an argument cursor, appending the encoded
/// bytes to `encoder` and returning the number of bytes produced.
///
/// With no encoder attached this is a dry run: the byte count is computed
/// but nothing is written, so a caller can size a buffer up front. Surplus
/// arguments are left in the iterator for the caller.
pub fn vformat(
    encoder: Option<&mut Encoder>,
    format: &str,
    args: &mut core::slice::Iter<'_, Arg<'_>>,
) -> Result<usize, Error> {
    let mut out = Output { encoder, written: 0 };
    let mut depth = 0usize;
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        match c {
            '(' => {
                depth += 1;
                out.put_byte(b'(')?;
            }
            ')' => {
                depth = depth.checked_sub(1).ok_or(Error::UnbalancedParens)?;
                out.put_byte(b')')?;
            }
            '%' => {
                let spec = chars.next().ok_or(Error::UnknownSpecifier('%'))?;
                let arg = args.next().ok_or(Error::TooFewArguments)?;
                match (spec, arg) {
                    ('s', Arg::Bytes(bytes)) => out.put_netstring(bytes)?,
                    ('z', Arg::Str(s)) => out.put_netstring(s.as_bytes())?,
                    ('i', Arg::UInt(x)) => {
                        out.put_netstring(strip_leading_zeros(&x.to_be_bytes()))?
                    }
                    ('b', Arg::Natural(magnitude)) => {
                        out.put_netstring(strip_leading_zeros(magnitude))?
                    }
                    ('l', Arg::Literal(bytes)) => out.put(bytes)?,
                    ('s' | 'z' | 'i' | 'b' | 'l', _) => return Err(Error::ArgumentMismatch),
                    _ => return Err(Error::UnknownSpecifier(spec)),
                }
            }
            _ => return Err(Error::BadFormat(c)),
        }
    }
    if depth != 0 {
        return Err(Error::UnbalancedParens);
    }
    Ok(out.written)
}

/// Formats one template, consuming exactly one argument per specifier, and
/// appends the canonical bytes to `encoder`. Returns the byte count.
pub fn format(encoder: &mut Encoder, format: &str, args: &[Arg]) -> Result<usize, Error> {
    let mut args = args.iter();
    let written = vformat(Some(encoder), format, &mut args)?;
    if args.next().is_some() {
        return Err(Error::TooManyArguments);
    }
    Ok(written)
}

/// Computes the byte count [`format`] would produce, without writing.
pub fn format_len(format: &str, args: &[Arg]) -> Result<usize, Error> {
    let mut args = args.iter();
    let written = vformat(None, format, &mut args)?;
    if args.next().is_some() {
        return Err(Error::TooManyArguments);
    }
    Ok(written)
}
