use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::de;

use crate::de::Decoder;
use crate::error::{DecodingError, EncodingError, Result};
use crate::ser::Encoder;

/// The parameter style, as defined by OpenAPI 3.0 on top of RFC 6570.
///
/// | style            | primitive   | array `[a, b]`     | object `{x: 1}`  |
/// |------------------|-------------|--------------------|------------------|
/// | `Form`           | `k=v`       | `k=a,b`            | `k=x,1`          |
/// | `Simple`         | `v`         | `a,b`              | `x,1`            |
/// | `Label`          | `.v`        | `.a,b`             | `.x,1`           |
/// | `Matrix`         | `;k=v`      | `;k=a,b`           | `;k=x,1`         |
/// | `SpaceDelimited` | `k=v`       | `k=a%20b`          | `k=x%201`        |
/// | `PipeDelimited`  | `k=v`       | `k=a\|b`           | `k=x\|1`         |
/// | `DeepObject`     | `k=v`       | unsupported        | `k[x]=1`         |
///
/// The table shows the non-exploded forms; see [`Config::explode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Style {
    Form,
    Simple,
    Label,
    Matrix,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
}

impl Style {
    /// The OpenAPI spelling of the style.
    pub const fn as_str(self) -> &'static str {
        match self {
            Style::Form => "form",
            Style::Simple => "simple",
            Style::Label => "label",
            Style::Matrix => "matrix",
            Style::SpaceDelimited => "spaceDelimited",
            Style::PipeDelimited => "pipeDelimited",
            Style::DeepObject => "deepObject",
        }
    }

    /// Styles whose wire format is a `&`-separated list of `key=value` pairs.
    pub(crate) const fn is_form_like(self) -> bool {
        matches!(
            self,
            Style::Form | Style::SpaceDelimited | Style::PipeDelimited
        )
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = DecodingError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "form" => Style::Form,
            "simple" => Style::Simple,
            "label" => Style::Label,
            "matrix" => Style::Matrix,
            "spaceDelimited" => Style::SpaceDelimited,
            "pipeDelimited" => Style::PipeDelimited,
            "deepObject" => Style::DeepObject,
            other => return Err(DecodingError::type_mismatch("an OpenAPI style", other)),
        })
    }
}

/// How a literal space is written on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpaceEscaping {
    /// `%20`, as required everywhere outside of form bodies.
    PercentEncoded,
    /// `+`, as used by `application/x-www-form-urlencoded` (RFC 1866).
    Plus,
}

impl SpaceEscaping {
    pub const fn as_str(self) -> &'static str {
        match self {
            SpaceEscaping::PercentEncoded => "percentEncoded",
            SpaceEscaping::Plus => "plus",
        }
    }
}

impl fmt::Display for SpaceEscaping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpaceEscaping {
    type Err = DecodingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "percentEncoded" => Ok(SpaceEscaping::PercentEncoded),
            "plus" => Ok(SpaceEscaping::Plus),
            other => Err(DecodingError::type_mismatch("a space escaping", other)),
        }
    }
}

/// Configuration for encoding and decoding behavior.
///
/// A `Config` is a small `Copy` value: build it once (typically from an
/// OpenAPI parameter's `style` and `explode` declaration) and pass it to
/// as many encode/decode calls as needed, from any thread.
///
/// Default value: `form` style, exploded, spaces as `%20`.
///
/// ```
/// use serde_uri::{Config, Style};
///
/// let config = Config::new().style(Style::Form).explode(false);
/// let colors = vec!["red", "green", "blue"];
/// assert_eq!(config.encode(&colors, "color").unwrap(), "color=red,green,blue");
///
/// let decoded: Vec<String> = config.decode("color=red,green,blue", "color").unwrap();
/// assert_eq!(decoded, colors);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub(crate) style: Style,
    pub(crate) explode: bool,
    pub(crate) space_escaping: SpaceEscaping,
    pub(crate) always_emit_key: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            style: Style::Form,
            explode: true,
            space_escaping: SpaceEscaping::PercentEncoded,
            always_emit_key: false,
        }
    }

    /// Sets the parameter style. Default is `Form`.
    pub const fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Whether collection members are written as separate occurrences
    /// (`color=red&color=blue`) rather than as one delimited value
    /// (`color=red,blue`). Default is `true`.
    ///
    /// `DeepObject` is always exploded.
    pub const fn explode(mut self, explode: bool) -> Self {
        self.explode = explode;
        self
    }

    /// Sets how spaces are escaped. Default is `PercentEncoded`.
    pub const fn space_escaping(mut self, space_escaping: SpaceEscaping) -> Self {
        self.space_escaping = space_escaping;
        self
    }

    /// When set, an absent value still emits its key (e.g. `name` for
    /// `form`, `;name` for `matrix`) to signal presence without a value.
    pub const fn always_emit_key(mut self, always_emit_key: bool) -> Self {
        self.always_emit_key = always_emit_key;
        self
    }

    pub(crate) const fn is_exploded(&self) -> bool {
        self.explode || matches!(self.style, Style::DeepObject)
    }

    /// Encodes `value` under `key`.
    ///
    /// The key may be empty, in which case a keyless pair like `=value`
    /// is produced for keyed styles.
    pub fn encode<T: serde::Serialize + ?Sized>(
        self,
        value: &T,
        key: &str,
    ) -> Result<String, EncodingError> {
        Encoder::new(self).encode(value, key)
    }

    /// Encodes `value` under `key` into a generic writer.
    pub fn encode_to_writer<T: serde::Serialize + ?Sized, W: Write>(
        self,
        value: &T,
        key: &str,
        writer: &mut W,
    ) -> Result<(), EncodingError> {
        let encoded = self.encode(value, key)?;
        writer.write_all(encoded.as_bytes())?;
        Ok(())
    }

    /// Decodes the value stored under `key` in `input`.
    pub fn decode<T: de::DeserializeOwned>(self, input: &str, key: &str) -> Result<T> {
        Decoder::new(self).decode(input, key)
    }

    /// Decodes a whole query string carrying several keys into a map or
    /// struct, one entry per key.
    pub fn decode_query<T: de::DeserializeOwned>(self, input: &str) -> Result<T> {
        Decoder::new(self).decode_query(input)
    }
}
