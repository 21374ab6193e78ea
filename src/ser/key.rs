use serde::ser;

use crate::error::{EncodingError, EncodingErrorKind};

type Result<T> = std::result::Result<T, EncodingError>;

macro_rules! serialize_key_itoa {
    (
        $($ty:ty => $meth:ident,)*) => {
        $(
            fn $meth(self, v: $ty) -> Result<String> {
                let mut buffer = itoa::Buffer::new();
                Ok(buffer.format(v).to_owned())
            }
        )*
    };
}

fn unsupported_key(kind: &str) -> EncodingError {
    EncodingError::new(EncodingErrorKind::UnsupportedValue(format!(
        "{kind} cannot be used as a dictionary key"
    )))
}

/// Stringifies dictionary keys. Only scalars are accepted.
pub(crate) struct KeySerializer;

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = EncodingError;
    type SerializeSeq = ser::Impossible<String, EncodingError>;
    type SerializeTuple = ser::Impossible<String, EncodingError>;
    type SerializeTupleStruct = ser::Impossible<String, EncodingError>;
    type SerializeTupleVariant = ser::Impossible<String, EncodingError>;
    type SerializeMap = ser::Impossible<String, EncodingError>;
    type SerializeStruct = ser::Impossible<String, EncodingError>;
    type SerializeStructVariant = ser::Impossible<String, EncodingError>;

    serialize_key_itoa! {
        u8  => serialize_u8,
        u16 => serialize_u16,
        u32 => serialize_u32,
        u64 => serialize_u64,
        i8  => serialize_i8,
        i16 => serialize_i16,
        i32 => serialize_i32,
        i64 => serialize_i64,
    }

    fn serialize_f32(self, _v: f32) -> Result<String> {
        Err(unsupported_key("a float"))
    }

    fn serialize_f64(self, _v: f64) -> Result<String> {
        Err(unsupported_key("a float"))
    }

    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(if v { "true" } else { "false" }.to_owned())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_owned())
    }

    fn serialize_bytes(self, value: &[u8]) -> Result<String> {
        std::str::from_utf8(value)
            .map(str::to_owned)
            .map_err(|_| unsupported_key("a non utf-8 byte buffer"))
    }

    fn serialize_unit(self) -> Result<String> {
        Err(unsupported_key("a unit"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(unsupported_key("a unit struct"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_owned())
    }

    fn serialize_newtype_struct<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + ser::Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String> {
        Err(unsupported_key("a newtype variant"))
    }

    fn serialize_none(self) -> Result<String> {
        Err(unsupported_key("an absent value"))
    }

    fn serialize_some<T: ?Sized + ser::Serialize>(self, value: &T) -> Result<String> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(unsupported_key("a sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(unsupported_key("a tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(unsupported_key("a tuple struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(unsupported_key("a tuple variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(unsupported_key("a map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(unsupported_key("a struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(unsupported_key("a struct variant"))
    }
}
