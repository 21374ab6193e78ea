use std::borrow::Cow;

use crate::config::{Config, SpaceEscaping};
use crate::error::{DecodingError, Result};

#[inline(always)]
fn char_to_digit(c: u8) -> Option<u8> {
    char::from(c).to_digit(16).map(|d| d as u8)
}

/// Decodes a single escaped key or value, applying the following:
/// - Replaces `+` with a space, when spaces are configured as `+`
/// - Decodes percent-encoded characters
/// - Converts the result to a UTF-8 string
///
/// A `%` which is not followed by two hex digits is an error.
pub fn decode(input: &str, config: Config) -> Result<Cow<'_, str>> {
    let plus_is_space = config.space_escaping == SpaceEscaping::Plus;
    let bytes = input.as_bytes();
    if !bytes
        .iter()
        .any(|&b| b == b'%' || (plus_is_space && b == b'+'))
    {
        return Ok(Cow::Borrowed(input));
    }

    let mut decoded = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'+' if plus_is_space => {
                decoded.push(b' ');
                idx += 1;
            }
            b'%' => {
                let hex = bytes.get(idx + 1).copied().and_then(char_to_digit).zip(
                    bytes.get(idx + 2).copied().and_then(char_to_digit),
                );
                let Some((h, l)) = hex else {
                    let end = (idx + 3).min(bytes.len());
                    let fragment = String::from_utf8_lossy(&bytes[idx..end]);
                    return Err(DecodingError::malformed(
                        &fragment,
                        config.style,
                        "invalid percent-encoded sequence",
                    ));
                };
                decoded.push(h * 0x10 + l);
                idx += 3;
            }
            b => {
                decoded.push(b);
                idx += 1;
            }
        }
    }

    String::from_utf8(decoded)
        .map(Cow::Owned)
        .map_err(|_| DecodingError::InvalidUtf8)
}
