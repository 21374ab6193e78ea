use std::fmt;

use serde::de::{self, IntoDeserializer, Unexpected};

use crate::error::DecodingError;

/// Deserializes a single decoded string, parsing it into whatever
/// primitive type the visitor asks for.
///
/// Unlike a plain string deserializer, a value which cannot be parsed as
/// the requested type is an error naming both the type and the raw string.
pub struct StringParsingDeserializer {
    value: String,
}

impl StringParsingDeserializer {
    pub fn new(value: String) -> Self {
        StringParsingDeserializer { value }
    }
}

macro_rules! deserialize_primitive {
    ($ty:ident, $method:ident, $visit_method:ident) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: de::Visitor<'de>,
        {
            match self.value.parse::<$ty>() {
                Ok(val) => visitor.$visit_method(val),
                Err(_) => Err(DecodingError::type_mismatch(
                    stringify!($ty),
                    format_args!("{:?}", self.value),
                )),
            }
        }
    };
}

impl<'de> de::Deserializer<'de> for StringParsingDeserializer {
    type Error = DecodingError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(self.value)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let mut chars = self.value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(DecodingError::type_mismatch(
                "char",
                format_args!("{:?}", self.value),
            )),
        }
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_byte_buf(self.value.into_bytes())
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        if self.value.is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        if self.value.is_empty() {
            visitor.visit_unit()
        } else {
            Err(de::Error::invalid_type(
                Unexpected::Str(&self.value),
                &"an empty value",
            ))
        }
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
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
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_enum(self.value.into_deserializer())
    }

    deserialize_primitive!(bool, deserialize_bool, visit_bool);
    deserialize_primitive!(i8, deserialize_i8, visit_i8);
    deserialize_primitive!(i16, deserialize_i16, visit_i16);
    deserialize_primitive!(i32, deserialize_i32, visit_i32);
    deserialize_primitive!(i64, deserialize_i64, visit_i64);
    deserialize_primitive!(i128, deserialize_i128, visit_i128);
    deserialize_primitive!(u8, deserialize_u8, visit_u8);
    deserialize_primitive!(u16, deserialize_u16, visit_u16);
    deserialize_primitive!(u32, deserialize_u32, visit_u32);
    deserialize_primitive!(u64, deserialize_u64, visit_u64);
    deserialize_primitive!(u128, deserialize_u128, visit_u128);
    deserialize_primitive!(f32, deserialize_f32, visit_f32);
    deserialize_primitive!(f64, deserialize_f64, visit_f64);

    serde::forward_to_deserialize_any! {
        str string seq tuple tuple_struct map struct identifier ignored_any
    }
}

impl fmt::Debug for StringParsingDeserializer {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter
            .debug_struct("StringParsingDeserializer")
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use serde::Deserialize;

    use super::StringParsingDeserializer;
    use crate::error::DecodingError;

    fn parse<'de, T: Deserialize<'de>>(s: &str) -> Result<T, DecodingError> {
        T::deserialize(StringParsingDeserializer::new(s.to_owned()))
    }

    #[test]
    fn parses_requested_type() {
        assert_eq!(parse::<u16>("8080").unwrap(), 8080);
        assert_eq!(parse::<f64>("-1.5").unwrap(), -1.5);
        assert!(parse::<bool>("true").unwrap());
        assert_eq!(parse::<String>("42").unwrap(), "42");
        assert_eq!(parse::<Option<u8>>("").unwrap(), None);
    }

    #[test]
    fn mismatch_names_type_and_input() {
        let err = parse::<i32>("abc").unwrap_err();
        match err {
            DecodingError::TypeMismatch { expected, found } => {
                assert_eq!(expected, "i32");
                assert_eq!(found, "\"abc\"");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse::<bool>("yes").is_err());
        assert!(parse::<char>("ab").is_err());
    }
}
