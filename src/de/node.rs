//! Reconstruction of values from a [`Node`].
//!
//! The target type drives the decoding: each `deserialize_*` call states
//! which shape the caller expects, and the node is reinterpreted to fit
//! it where the wire format is ambiguous. In particular, a flat `Array`
//! is paired up into key/value entries when a map or struct is requested.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::vec;

use serde::de::{self, IntoDeserializer};

use super::string_parser::StringParsingDeserializer;
use crate::error::{DecodingError, Result};
use crate::node::Node;

pub struct NodeDeserializer(Node);

impl NodeDeserializer {
    pub fn new(node: Node) -> Self {
        NodeDeserializer(node)
    }

    /// Takes the node as a scalar.
    fn into_primitive(self, expected: &'static str) -> Result<StringParsingDeserializer> {
        match self.0 {
            Node::Primitive(s) => Ok(StringParsingDeserializer::new(s)),
            Node::Unset => Err(DecodingError::value_not_found(expected)),
            other => Err(DecodingError::type_mismatch(expected, other.shape())),
        }
    }

    /// Takes the node as a sequence. A single primitive is a sequence of
    /// one, and absent or empty values are empty sequences.
    fn into_seq(self) -> Result<Vec<Node>> {
        match self.0 {
            Node::Array(items) => Ok(items),
            Node::Unset => Ok(Vec::new()),
            Node::Primitive(s) if s.is_empty() => Ok(Vec::new()),
            primitive @ Node::Primitive(_) => Ok(vec![primitive]),
            Node::Dictionary(_) => Err(DecodingError::type_mismatch("a sequence", "a dictionary")),
        }
    }

    /// Takes the node as keyed entries, pairing up the elements of a flat
    /// array as `name, value, name, value, ...`.
    fn into_map(self) -> Result<BTreeMap<String, Node>> {
        match self.0 {
            Node::Dictionary(map) => Ok(map),
            Node::Array(items) => pair_up(items),
            Node::Unset => Ok(BTreeMap::new()),
            Node::Primitive(s) if s.is_empty() => Ok(BTreeMap::new()),
            Node::Primitive(s) => Err(DecodingError::type_mismatch(
                "a dictionary",
                format_args!("{s:?}"),
            )),
        }
    }
}

fn pair_up(items: Vec<Node>) -> Result<BTreeMap<String, Node>> {
    if items.len() % 2 != 0 {
        return Err(DecodingError::PairingArity { len: items.len() });
    }
    let mut map = BTreeMap::new();
    let mut items = items.into_iter();
    while let (Some(name), Some(value)) = (items.next(), items.next()) {
        let Node::Primitive(name) = name else {
            return Err(DecodingError::type_mismatch("a member name", name.shape()));
        };
        map.insert(name, value);
    }
    Ok(map)
}

macro_rules! deserialize_primitive {
    ($ty:ident, $method:ident) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            self.into_primitive(stringify!($ty))?.$method(visitor)
        }
    };
}

impl<'de> de::Deserializer<'de> for NodeDeserializer {
    type Error = DecodingError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Node::Unset => visitor.visit_none(),
            Node::Primitive(s) => visitor.visit_string(s),
            Node::Array(items) => visitor.visit_seq(NodeSeq(items.into_iter())),
            Node::Dictionary(map) => visitor.visit_map(NodeMap::new(map)),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if matches!(self.0, Node::Unset) {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_seq(NodeSeq(self.into_seq()?.into_iter()))
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(NodeMap::new(self.into_map()?))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.0 {
            Node::Primitive(variant) => visitor.visit_enum(variant.into_deserializer()),
            Node::Unset => Err(DecodingError::value_not_found("an enum variant")),
            other => {
                let shape = other.shape();
                let mut entries = NodeDeserializer(other).into_map()?.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => {
                        visitor.visit_enum(NodeEnum { variant, value })
                    }
                    _ => Err(DecodingError::type_mismatch("a single-entry enum variant", shape)),
                }
            }
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    deserialize_primitive!(bool, deserialize_bool);
    deserialize_primitive!(i8, deserialize_i8);
    deserialize_primitive!(i16, deserialize_i16);
    deserialize_primitive!(i32, deserialize_i32);
    deserialize_primitive!(i64, deserialize_i64);
    deserialize_primitive!(i128, deserialize_i128);
    deserialize_primitive!(u8, deserialize_u8);
    deserialize_primitive!(u16, deserialize_u16);
    deserialize_primitive!(u32, deserialize_u32);
    deserialize_primitive!(u64, deserialize_u64);
    deserialize_primitive!(u128, deserialize_u128);
    deserialize_primitive!(f32, deserialize_f32);
    deserialize_primitive!(f64, deserialize_f64);
    deserialize_primitive!(char, deserialize_char);
    deserialize_primitive!(str, deserialize_str);
    deserialize_primitive!(string, deserialize_string);
    deserialize_primitive!(bytes, deserialize_bytes);
    deserialize_primitive!(byte_buf, deserialize_byte_buf);
    deserialize_primitive!(unit, deserialize_unit);
    deserialize_primitive!(identifier, deserialize_identifier);

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }
}

struct NodeSeq(vec::IntoIter<Node>);

impl<'de> de::SeqAccess<'de> for NodeSeq {
    type Error = DecodingError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.0.next() {
            Some(node) => seed.deserialize(NodeDeserializer(node)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.0.len())
    }
}

struct NodeMap {
    iter: btree_map::IntoIter<String, Node>,
    value: Option<Node>,
}

impl NodeMap {
    fn new(map: BTreeMap<String, Node>) -> Self {
        NodeMap {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for NodeMap {
    type Error = DecodingError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        if let Some((key, value)) = self.iter.next() {
            self.value = Some(value);
            return seed.deserialize(StringParsingDeserializer::new(key)).map(Some);
        };
        Ok(None)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        if let Some(v) = self.value.take() {
            seed.deserialize(NodeDeserializer(v))
        } else {
            Err(de::Error::custom(
                "Somehow the list was empty after a non-empty key was returned",
            ))
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// An enum encoded as a single-entry dictionary `{variant: value}`.
struct NodeEnum {
    variant: String,
    value: Node,
}

impl<'de> de::EnumAccess<'de> for NodeEnum {
    type Error = DecodingError;
    type Variant = NodeDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(StringParsingDeserializer::new(self.variant))?;
        Ok((variant, NodeDeserializer(self.value)))
    }
}

impl<'de> de::VariantAccess<'de> for NodeDeserializer {
    type Error = DecodingError;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(self, visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_map(self, visitor)
    }
}
