use std::fmt::{self, Display};
use std::io;

use serde::{de, ser};

use crate::config::Style;

/// Alias for a `Result` with the error type [`DecodingError`].
pub type Result<T, E = DecodingError> = std::result::Result<T, E>;

/// Error raised while turning a value into a URI string.
///
/// Carries the path of keys leading to the offending value, outermost
/// first, so `filter.tags.2` points at the third element of the `tags`
/// field of `filter`.
#[derive(Debug)]
pub struct EncodingError {
    path: Vec<String>,
    kind: EncodingErrorKind,
}

#[derive(Debug, thiserror::Error)]
pub enum EncodingErrorKind {
    /// A leaf value has no string representation (e.g. `NaN`, non UTF-8 bytes).
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),
    /// A container was found inside another container for a style which
    /// can only express a single level.
    #[error("nested containers are not supported by style `{0}`")]
    NestedContainer(Style),
    #[error("style `{style}` cannot express {shape}")]
    UnsupportedStyle { style: Style, shape: &'static str },
    #[error("{0}")]
    Custom(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl EncodingError {
    pub(crate) fn new(kind: EncodingErrorKind) -> Self {
        Self { path: Vec::new(), kind }
    }

    pub(crate) fn unsupported_value(msg: impl Display) -> Self {
        Self::new(EncodingErrorKind::UnsupportedValue(msg.to_string()))
    }

    /// Prepends `segment` to the key path.
    pub(crate) fn at(mut self, segment: impl Into<String>) -> Self {
        self.path.insert(0, segment.into());
        self
    }

    /// The key path leading to the value that failed to encode.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn kind(&self) -> &EncodingErrorKind {
        &self.kind
    }
}

impl Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} at `{}`", self.kind, self.path.join("."))
        }
    }
}

impl std::error::Error for EncodingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            EncodingErrorKind::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for EncodingError {
    fn from(e: io::Error) -> Self {
        Self::new(EncodingErrorKind::Io(e))
    }
}

impl ser::Error for EncodingError {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Self::new(EncodingErrorKind::Custom(msg.to_string()))
    }
}

/// Error raised while turning a URI string back into a value.
#[derive(Debug, thiserror::Error)]
pub enum DecodingError {
    /// The value was present but has the wrong shape or cannot be parsed
    /// as the expected type.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    /// A required value was absent.
    #[error("value not found: expected {expected}")]
    ValueNotFound { expected: String },
    /// An object was recovered from a flat list with an odd number of
    /// elements, so names and values cannot be paired up.
    #[error("cannot pair {len} elements into key/value entries")]
    PairingArity { len: usize },
    #[error("malformed `{style}` input `{input}`: {reason}")]
    Malformed {
        input: String,
        style: Style,
        reason: &'static str,
    },
    #[error("input contains invalid utf-8")]
    InvalidUtf8,
    #[error("{0}")]
    Custom(String),
}

impl DecodingError {
    pub(crate) fn type_mismatch(expected: impl Display, found: impl Display) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub(crate) fn value_not_found(expected: impl Display) -> Self {
        Self::ValueNotFound {
            expected: expected.to_string(),
        }
    }

    pub(crate) fn malformed(input: &str, style: Style, reason: &'static str) -> Self {
        Self::Malformed {
            input: input.to_owned(),
            style,
            reason,
        }
    }
}

impl de::Error for DecodingError {
    fn custom<T>(msg: T) -> Self
    where
        T: Display,
    {
        Self::Custom(msg.to_string())
    }

    fn invalid_type(unexp: de::Unexpected<'_>, exp: &dyn de::Expected) -> Self {
        Self::type_mismatch(exp, unexp)
    }

    fn missing_field(field: &'static str) -> Self {
        Self::value_not_found(format_args!("field `{field}`"))
    }
}
