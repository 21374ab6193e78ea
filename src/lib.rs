//! Serde support for URI parameters in the styles defined by
//! [RFC 6570](https://www.rfc-editor.org/rfc/rfc6570) and the
//! [OpenAPI 3.0 parameter serialization rules](https://spec.openapis.org/oas/v3.0.3#style-values).
//!
//! A single value is encoded under a key, following a [`Style`] and the
//! `explode` flag declared for the parameter. The same [`Config`] decodes
//! the resulting string back into a value.
//!
//! ## Supported Types
//!
//! Primitives (numbers, booleans, strings, chars, unit-like enum variants)
//! are written as-is, escaped. Sequences become arrays and structs or maps
//! become dictionaries. Only `deepObject` can express containers nested in
//! other containers; every other style reports an [`EncodingError`].
//!
//! `None` is distinct from an empty string: it emits nothing at all (or a
//! bare key, with [`Config::always_emit_key`]).
//!
//! ## Usage
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use serde_uri::{Config, Style};
//!
//! #[derive(Debug, PartialEq, Deserialize, Serialize)]
//! struct Rgb {
//!     #[serde(rename = "R")]
//!     r: u8,
//!     #[serde(rename = "G")]
//!     g: u8,
//!     #[serde(rename = "B")]
//!     b: u8,
//! }
//!
//! let color = Rgb { r: 100, g: 200, b: 150 };
//!
//! let config = Config::new().style(Style::Form).explode(false);
//! let encoded = config.encode(&color, "color").unwrap();
//! assert_eq!(encoded, "color=R,100,G,200,B,150");
//! assert_eq!(config.decode::<Rgb>(&encoded, "color").unwrap(), color);
//!
//! let config = Config::new().style(Style::DeepObject);
//! let encoded = config.encode(&color, "color").unwrap();
//! assert_eq!(encoded, "color[R]=100&color[G]=200&color[B]=150");
//! assert_eq!(config.decode::<Rgb>(&encoded, "color").unwrap(), color);
//! ```

mod config;
mod de;
mod error;
mod node;
mod ser;

#[doc(inline)]
pub use config::{Config, SpaceEscaping, Style};
#[doc(inline)]
pub use de::{Decoder, from_query_str, from_str};
pub use error::{DecodingError, EncodingError, EncodingErrorKind, Result};
#[doc(inline)]
pub use ser::{Encoder, to_string};
