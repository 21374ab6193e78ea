//! Conversion of any `Serialize` value into a [`Node`].

use std::collections::BTreeMap;

use serde::ser;

use super::key::KeySerializer;
use crate::error::EncodingError;
use crate::node::Node;

type Result<T> = std::result::Result<T, EncodingError>;

/// A serializer producing the intermediate [`Node`] for a value.
///
/// Scalars become `Primitive`, sequences become `Array`, maps and structs
/// become `Dictionary`, and `None` becomes `Unset`. Nesting is unbounded:
/// whether a given style can express the resulting tree is decided later
/// by the writer.
pub struct NodeSerializer;

macro_rules! serialize_itoa {
    (
        $($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Node> {
                let mut buffer = itoa::Buffer::new();
                Ok(Node::Primitive(buffer.format(v).to_owned()))
            }
        )*
    };
}

macro_rules! serialize_ryu {
    (
        $($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<Node> {
                if !v.is_finite() {
                    return Err(EncodingError::unsupported_value(format_args!(
                        "{} cannot be represented in a URI",
                        v
                    )));
                }
                let mut buffer = ryu::Buffer::new();
                Ok(Node::Primitive(buffer.format_finite(v).to_owned()))
            }
        )*
    };
}

impl ser::Serializer for NodeSerializer {
    type Ok = Node;
    type Error = EncodingError;
    type SerializeSeq = SeqSerializer;
    type SerializeTuple = SeqSerializer;
    type SerializeTupleStruct = SeqSerializer;
    type SerializeTupleVariant = VariantSerializer<SeqSerializer>;
    type SerializeMap = MapSerializer;
    type SerializeStruct = MapSerializer;
    type SerializeStructVariant = VariantSerializer<MapSerializer>;

    serialize_itoa! {
        u8  => serialize_u8,
        u16 => serialize_u16,
        u32 => serialize_u32,
        u64 => serialize_u64,
        u128 => serialize_u128,
        i8  => serialize_i8,
        i16 => serialize_i16,
        i32 => serialize_i32,
        i64 => serialize_i64,
        i128 => serialize_i128,
    }
    serialize_ryu! {
        f32 => serialize_f32,
        f64 => serialize_f64,
    }

    fn serialize_bool(self, v: bool) -> Result<Node> {
        Ok(Node::from(if v { "true" } else { "false" }))
    }

    fn serialize_char(self, v: char) -> Result<Node> {
        Ok(Node::Primitive(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Node> {
        Ok(Node::from(v))
    }

    fn serialize_bytes(self, value: &[u8]) -> Result<Node> {
        match std::str::from_utf8(value) {
            Ok(s) => Ok(Node::from(s)),
            Err(_) => Err(EncodingError::unsupported_value(
                "byte buffer is not valid utf-8",
            )),
        }
    }

    fn serialize_none(self) -> Result<Node> {
        Ok(Node::Unset)
    }

    fn serialize_some<T: ?Sized + ser::Serialize>(self, value: &T) -> Result<Node> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node> {
        Ok(Node::from(""))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node> {
        Ok(Node::from(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Node> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node> {
        let inner = value.serialize(self).map_err(|e| e.at(variant))?;
        Ok(single_entry(variant, inner))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SeqSerializer::with_capacity(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        Ok(SeqSerializer::with_capacity(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(SeqSerializer::with_capacity(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(VariantSerializer {
            variant,
            inner: SeqSerializer::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapSerializer::default())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(MapSerializer::default())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(VariantSerializer {
            variant,
            inner: MapSerializer::default(),
        })
    }
}

fn single_entry(key: &str, value: Node) -> Node {
    let mut map = BTreeMap::new();
    map.insert(key.to_owned(), value);
    Node::Dictionary(map)
}

#[doc(hidden)]
pub struct SeqSerializer {
    items: Vec<Node>,
}

impl SeqSerializer {
    fn with_capacity(len: usize) -> Self {
        Self {
            items: Vec::with_capacity(len),
        }
    }

    fn push<T: ?Sized + ser::Serialize>(&mut self, value: &T) -> Result<()> {
        let index = self.items.len();
        let node = value
            .serialize(NodeSerializer)
            .map_err(|e| e.at(index.to_string()))?;
        self.items.push(node);
        Ok(())
    }
}

impl ser::SerializeSeq for SeqSerializer {
    type Ok = Node;
    type Error = EncodingError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqSerializer {
    type Ok = Node;
    type Error = EncodingError;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Array(self.items))
    }
}

impl ser::SerializeTupleStruct for SeqSerializer {
    type Ok = Node;
    type Error = EncodingError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.push(value)
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Array(self.items))
    }
}

#[doc(hidden)]
#[derive(Default)]
pub struct MapSerializer {
    entries: BTreeMap<String, Node>,
    next_key: Option<String>,
}

impl MapSerializer {
    fn insert<T: ?Sized + ser::Serialize>(&mut self, key: String, value: &T) -> Result<()> {
        let node = value.serialize(NodeSerializer).map_err(|e| e.at(&key))?;
        self.entries.insert(key, node);
        Ok(())
    }
}

impl ser::SerializeMap for MapSerializer {
    type Ok = Node;
    type Error = EncodingError;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.next_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        let Some(key) = self.next_key.take() else {
            return Err(ser::Error::custom(
                "internal error: map value serialized before its key",
            ));
        };
        self.insert(key, value)
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Dictionary(self.entries))
    }
}

impl ser::SerializeStruct for MapSerializer {
    type Ok = Node;
    type Error = EncodingError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.insert(key.to_owned(), value)
    }

    fn end(self) -> Result<Node> {
        Ok(Node::Dictionary(self.entries))
    }
}

/// Wraps the content of a tuple or struct variant as `{variant: content}`.
#[doc(hidden)]
pub struct VariantSerializer<S> {
    variant: &'static str,
    inner: S,
}

impl ser::SerializeTupleVariant for VariantSerializer<SeqSerializer> {
    type Ok = Node;
    type Error = EncodingError;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.inner.push(value).map_err(|e| e.at(self.variant))
    }

    fn end(self) -> Result<Node> {
        Ok(single_entry(self.variant, Node::Array(self.inner.items)))
    }
}

impl ser::SerializeStructVariant for VariantSerializer<MapSerializer> {
    type Ok = Node;
    type Error = EncodingError;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ser::Serialize + ?Sized,
    {
        self.inner
            .insert(key.to_owned(), value)
            .map_err(|e| e.at(self.variant))
    }

    fn end(self) -> Result<Node> {
        Ok(single_entry(self.variant, Node::Dictionary(self.inner.entries)))
    }
}
