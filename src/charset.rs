/*!
 * Text codec layer.
 *
 * Decoding picks the charset in this order:
 * 1. the explicit hint, if any (a BOM for that same charset is removed);
 * 2. a UTF-8, UTF-16LE or UTF-16BE byte-order mark;
 * 3. the configured default charset.
 *
 * No statistical guessing is done beyond BOM sniffing.
 */

use encoding_rs::{DecoderResult, Encoding, UTF_16BE, UTF_16LE};
use log::{debug, warn};

use crate::errors::ConversionError;

/// Pick the charset for `bytes` and the length of the BOM to skip
pub fn detect(
    bytes: &[u8],
    hint: Option<&'static Encoding>,
    default: &'static Encoding,
) -> (&'static Encoding, usize) {
    let sniffed = Encoding::for_bom(bytes);
    match (hint, sniffed) {
        (Some(hint), Some((bom_encoding, bom_len))) if hint == bom_encoding => (hint, bom_len),
        (Some(hint), _) => (hint, 0),
        (None, Some((bom_encoding, bom_len))) => (bom_encoding, bom_len),
        (None, None) => (default, 0),
    }
}

/// Decode `bytes` to a string
///
/// With `ignore_errors`, malformed sequences become U+FFFD; otherwise the
/// first malformed sequence aborts with its byte offset in `bytes`.
pub fn decode(
    bytes: &[u8],
    hint: Option<&'static Encoding>,
    default: &'static Encoding,
    ignore_errors: bool,
) -> Result<String, ConversionError> {
    let (encoding, bom_len) = detect(bytes, hint, default);
    debug!(
        "Decoding {} bytes as {} (hint: {}, BOM: {} bytes)",
        bytes.len(),
        encoding.name(),
        hint.map_or("none", |h| h.name()),
        bom_len
    );
    let body = &bytes[bom_len..];

    if ignore_errors {
        let (text, had_errors) = encoding.decode_without_bom_handling(body);
        if had_errors {
            warn!("Replaced undecodable bytes while decoding as {}", encoding.name());
        }
        return Ok(text.into_owned());
    }

    decode_strict(body, encoding).map_err(|offset| ConversionError::Decode {
        charset: encoding.name().to_string(),
        offset: offset + bom_len,
    })
}

// Returns the offset of the first malformed sequence on failure
fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Result<String, usize> {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(bytes.len())
        .unwrap_or(bytes.len());
    let mut output = String::with_capacity(capacity);
    let mut consumed = 0;

    loop {
        let (result, read) =
            decoder.decode_to_string_without_replacement(&bytes[consumed..], &mut output, true);
        consumed += read;
        match result {
            DecoderResult::InputEmpty => return Ok(output),
            DecoderResult::OutputFull => {
                let remaining = bytes.len() - consumed;
                output.reserve(
                    decoder
                        .max_utf8_buffer_length_without_replacement(remaining)
                        .unwrap_or(remaining)
                        .max(4),
                );
            }
            DecoderResult::Malformed(bad, extra) => {
                return Err(consumed.saturating_sub(bad as usize + extra as usize));
            }
        }
    }
}

/// Encode `text` in `encoding`
///
/// UTF-16 output is written by hand with a leading BOM, since encoding_rs
/// only encodes to ASCII-compatible charsets. Characters the target cannot
/// represent become numeric character references; encoding never fails.
pub fn encode(text: &str, encoding: &'static Encoding) -> Vec<u8> {
    if encoding == UTF_16LE || encoding == UTF_16BE {
        let little_endian = encoding == UTF_16LE;
        let mut output = Vec::with_capacity((text.len() + 1) * 2);
        for unit in std::iter::once(0xFEFF).chain(text.encode_utf16()) {
            let bytes = if little_endian {
                unit.to_le_bytes()
            } else {
                unit.to_be_bytes()
            };
            output.extend_from_slice(&bytes);
        }
        return output;
    }

    let (bytes, used, had_errors) = encoding.encode(text);
    if had_errors {
        warn!(
            "Some characters cannot be represented in {}, written as character references",
            used.name()
        );
    }
    bytes.into_owned()
}
