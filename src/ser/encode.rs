use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

use crate::config::{SpaceEscaping, Style};

/// Everything except the RFC 3986 unreserved characters
/// (`ALPHA / DIGIT / "-" / "." / "_" / "~"`).
///
/// Spaces are left out of the set and handled separately, since their
/// escaping depends on the configuration.
const UNRESERVED_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b' ')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Label style uses `.` as its member prefix, so it must be escaped inside
/// values for the output to be parsed back.
const LABEL_SET: &AsciiSet = &UNRESERVED_SET.add(b'.');

/// Percent-encodes a key or a value.
///
/// The function returns an iterator to avoid allocations when no encoding
/// is needed.
pub fn encode(
    s: &str,
    style: Style,
    spaces: SpaceEscaping,
) -> impl Iterator<Item = Cow<'_, str>> + '_ {
    let set = if style == Style::Label {
        LABEL_SET
    } else {
        UNRESERVED_SET
    };
    let space = match spaces {
        SpaceEscaping::PercentEncoded => "%20",
        SpaceEscaping::Plus => "+",
    };
    percent_encoding::utf8_percent_encode(s, set).map(move |chunk| {
        if chunk.contains(' ') {
            Cow::Owned(chunk.replace(' ', space))
        } else {
            Cow::Borrowed(chunk)
        }
    })
}

/// Appends the escaped form of `s` to `out`.
pub fn encode_into(out: &mut String, s: &str, style: Style, spaces: SpaceEscaping) {
    for chunk in encode(s, style, spaces) {
        out.push_str(&chunk);
    }
}
