use super::{decode, encode};
use base64::{
    Engine,
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use thiserror::Error;

/* Standard alphabet, padding emitted on encode but not demanded on decode */
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Transport encoding must start with '{{'")]
    MissingBracket,

    #[error("Unterminated transport bracket")]
    UnterminatedBracket,

    #[error("Invalid base64 in transport encoding")]
    InvalidBase64,

    #[error(transparent)]
    Decode(#[from] decode::Error),

    #[error(transparent)]
    Encode(#[from] encode::Error),
}

fn decode_quad(quad: &[u8]) -> Result<([u8; 3], usize), Error> {
    let mut out = [0u8; 3];
    let n = BASE64
        .decode_slice(quad, &mut out)
        .map_err(|_| Error::InvalidBase64)?;
    Ok((out, n))
}

/// Rewrites a `{base64}` transport block at the front of `data` into
/// canonical bytes, in place, returning the canonical length.
///
/// Base64 output is always shorter than its input, so the decoded run is
/// written over the region already consumed and never catches up with the
/// read position. Whitespace inside the block is skipped.
pub fn decode_in_place(data: &mut [u8]) -> Result<usize, Error> {
    if data.first() != Some(&b'{') {
        return Err(Error::MissingBracket);
    }
    let mut read = 1;
    let mut write = 0;
    let mut quad = [0u8; 4];
    let mut quad_len = 0;
    let mut ended = false;
    loop {
        let Some(&c) = data.get(read) else {
            return Err(Error::UnterminatedBracket);
        };
        read += 1;
        match c {
            b'}' => break,
            c if c.is_ascii_whitespace() => {}
            _ if ended => return Err(Error::InvalidBase64),
            c => {
                quad[quad_len] = c;
                quad_len += 1;
                if quad_len == 4 {
                    let (out, n) = decode_quad(&quad)?;
                    data[write..write + n].copy_from_slice(&out[..n]);
                    write += n;
                    quad_len = 0;
                    // A padded quad can only be the final one
                    ended = n < 3;
                }
            }
        }
    }
    if quad_len > 0 {
        let (out, n) = decode_quad(&quad[..quad_len])?;
        data[write..write + n].copy_from_slice(&out[..n]);
        write += n;
    }
    Ok(write)
}

/// Transport-decodes `data` in place, then positions a cursor at the first
/// expression of the canonical run.
pub fn first(data: &mut [u8]) -> Result<decode::Cursor<'_>, Error> {
    let len = decode_in_place(data)?;
    decode::Cursor::first(&data[..len]).map_err(Into::into)
}

/// As [`encode::vformat`], but wraps the canonical output in a `{base64}`
/// transport block.
pub fn vformat(
    encoder: Option<&mut encode::Encoder>,
    format: &str,
    args: &mut core::slice::Iter<'_, encode::Arg<'_>>,
) -> Result<usize, Error> {
    let mut scratch = encode::Encoder::new();
    encode::vformat(Some(&mut scratch), format, args)?;
    let body = BASE64.encode(scratch.as_slice());
    if let Some(encoder) = encoder {
        encoder.push(b'{')?;
        encoder.append(body.as_bytes())?;
        encoder.push(b'}')?;
    }
    Ok(body.len() + 2)
}

/// As [`encode::format`], but wraps the canonical output in a `{base64}`
/// transport block.
pub fn format(encoder: &mut encode::Encoder, format: &str, args: &[encode::Arg]) -> Result<usize, Error> {
    let mut args = args.iter();
    let written = vformat(Some(encoder), format, &mut args)?;
    if args.next().is_some() {
        return Err(encode::Error::TooManyArguments.into());
    }
    Ok(written)
}

/// Computes the byte count [`format`] would produce, without writing.
pub fn format_len(format: &str, args: &[encode::Arg]) -> Result<usize, Error> {
    let mut args = args.iter();
    let written = vformat(None, format, &mut args)?;
    if args.next().is_some() {
        return Err(encode::Error::TooManyArguments.into());
    }
    Ok(written)
}
