//! Deserialization support for URI parameters.
//!
//! ### An overview of the design
//!
//! Decoding happens in two steps. The `parse` module first turns the raw
//! string into a [`Root`]: a map from each key found on the wire to a
//! [`Node`] tree. It does so without any knowledge of the target type,
//! which means some shapes cannot be told apart at that stage; a
//! non-exploded object `R,100,G,200` is parsed as a flat array, exactly
//! like a list of four strings would be.
//!
//! The tree is then handed to `NodeDeserializer`, a `serde::Deserializer`
//! which lets the target type ask for the shape it expects and
//! reinterprets the node accordingly. Scalars are parsed lazily by
//! `StringParsingDeserializer`, once the requested primitive type is known.
//!
//! `RootDeserializer` sits in front of both and picks the part of the root
//! a keyed decode is about. Exploded `form` and `matrix` objects spread
//! their members over the top-level keys, so when a struct or map is
//! requested from those styles the whole root is used.

mod node;
mod parse;
mod string_parser;

use serde::de;

use crate::config::{Config, Style};
use crate::error::{DecodingError, Result};
use crate::node::{Node, Root};
use node::NodeDeserializer;

/// Decodes the value stored under `key` with the default [`Config`]
/// (`form` style, exploded).
///
/// ```
/// let colors: Vec<String> =
///     serde_uri::from_str("color=red&color=green&color=blue", "color").unwrap();
/// assert_eq!(colors, ["red", "green", "blue"]);
///
/// let name: Option<String> = serde_uri::from_str("", "name").unwrap();
/// assert_eq!(name, None);
/// ```
pub fn from_str<T: de::DeserializeOwned>(input: &str, key: &str) -> Result<T> {
    Config::default().decode(input, key)
}

/// Decodes a query string carrying several keys into a map or struct, with
/// the default [`Config`].
///
/// ```
/// # use serde::Deserialize;
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct Query {
///     name: String,
///     age: u8,
///     tags: Vec<String>,
/// }
///
/// let query: Query = serde_uri::from_query_str("name=Alice&age=24&tags=a&tags=b").unwrap();
/// assert_eq!(
///     query,
///     Query {
///         name: "Alice".to_owned(),
///         age: 24,
///         tags: vec!["a".to_owned(), "b".to_owned()],
///     }
/// );
/// ```
pub fn from_query_str<T: de::DeserializeOwned>(input: &str) -> Result<T> {
    Config::default().decode_query(input)
}

/// Turns URI strings back into values according to a [`Config`].
#[derive(Clone, Copy, Debug)]
pub struct Decoder {
    config: Config,
}

impl Decoder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Decodes the value stored under `key` in `input`.
    pub fn decode<T: de::DeserializeOwned>(&self, input: &str, key: &str) -> Result<T> {
        let _span = tracing::trace_span!(
            "decode",
            key,
            style = %self.config.style,
            explode = self.config.explode,
        )
        .entered();

        let result = self
            .parse(input, key)
            .and_then(|root| T::deserialize(RootDeserializer::for_key(root, key, self.config)));
        if let Err(error) = &result {
            tracing::debug!(%error, input, "failed to decode value");
        }
        result
    }

    /// Decodes every key of `input` as the entries of a map or struct.
    pub fn decode_query<T: de::DeserializeOwned>(&self, input: &str) -> Result<T> {
        let _span = tracing::trace_span!(
            "decode_query",
            style = %self.config.style,
            explode = self.config.explode,
        )
        .entered();

        let result = self
            .parse(input, "")
            .and_then(|root| T::deserialize(RootDeserializer::for_query(root, self.config)));
        if let Err(error) = &result {
            tracing::debug!(%error, input, "failed to decode query");
        }
        result
    }

    fn parse(&self, input: &str, key: &str) -> Result<Root> {
        let root = parse::parse(input, key, self.config)?;
        tracing::trace!(?root, "parsed input");
        Ok(root)
    }
}

/// The top-level deserializer, selecting the node a decode call is about.
struct RootDeserializer {
    root: Root,
    key: Option<String>,
    config: Config,
}

impl RootDeserializer {
    fn for_key(root: Root, key: &str, config: Config) -> Self {
        RootDeserializer {
            root,
            key: Some(key.to_owned()),
            config,
        }
    }

    fn for_query(root: Root, config: Config) -> Self {
        RootDeserializer {
            root,
            key: None,
            config,
        }
    }

    /// Exploded `form` and `matrix` objects write their members as
    /// top-level keys, e.g. `R=100&G=200`.
    fn spreads_objects(&self) -> bool {
        self.config.is_exploded()
            && (self.config.style.is_form_like() || self.config.style == Style::Matrix)
    }

    fn into_node(mut self, wants_object: bool) -> Node {
        let Some(key) = self.key.take() else {
            return Node::Dictionary(self.root);
        };
        if wants_object && self.spreads_objects() {
            return Node::Dictionary(self.root);
        }
        self.root.remove(&key).unwrap_or(Node::Unset)
    }

    fn into_deserializer(self, wants_object: bool) -> NodeDeserializer {
        NodeDeserializer::new(self.into_node(wants_object))
    }
}

macro_rules! forward_to_node {
    ($($method:ident,)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                de::Deserializer::$method(self.into_deserializer(false), visitor)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for RootDeserializer {
    type Error = DecodingError;

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        // a missing key is absent in every style, including those where
        // exploded objects spread over the root
        let present = match &self.key {
            None => true,
            Some(key) => match self.root.get(key) {
                None | Some(Node::Unset) => false,
                // `simple` writes an absent value and an empty string alike
                Some(Node::Primitive(s)) if s.is_empty() => self.config.style != Style::Simple,
                Some(_) => true,
            },
        };
        if present {
            visitor.visit_some(self)
        } else {
            visitor.visit_none()
        }
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_map(self.into_deserializer(true), visitor)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_struct(self.into_deserializer(true), name, fields, visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        // unit variants are primitives stored under the key, other variants
        // are single-entry objects
        let wants_object = match &self.key {
            Some(key) => !self.root.contains_key(key),
            None => true,
        };
        de::Deserializer::deserialize_enum(
            self.into_deserializer(wants_object),
            name,
            variants,
            visitor,
        )
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_tuple(self.into_deserializer(false), len, visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_tuple_struct(
            self.into_deserializer(false),
            name,
            len,
            visitor,
        )
    }

    fn deserialize_unit_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_unit_struct(self.into_deserializer(false), name, visitor)
    }

    forward_to_node! {
        deserialize_any,
        deserialize_bool,
        deserialize_i8,
        deserialize_i16,
        deserialize_i32,
        deserialize_i64,
        deserialize_i128,
        deserialize_u8,
        deserialize_u16,
        deserialize_u32,
        deserialize_u64,
        deserialize_u128,
        deserialize_f32,
        deserialize_f64,
        deserialize_char,
        deserialize_str,
        deserialize_string,
        deserialize_bytes,
        deserialize_byte_buf,
        deserialize_unit,
        deserialize_seq,
        deserialize_identifier,
        deserialize_ignored_any,
    }
}
