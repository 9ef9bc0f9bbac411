// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

//! `serde` deserializer reading [`Value`] trees. The inverse of
//! [`crate::xmlrpc::ser`]; `Value` is self-describing, so everything goes
//! through `deserialize_any` except options, enums and newtypes.

use serde::de::{
    self, DeserializeOwned, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess,
    Visitor,
};
use serde::forward_to_deserialize_any;

use crate::error::{Error, Result};
use crate::xmlrpc::encoding::datetime_to_wire;
use crate::xmlrpc::value::{Struct, Value};

/// Builds any deserializable type out of a [`Value`] tree.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(value)
}

impl<'de> de::Deserializer<'de> for Value {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self {
            Value::Nil => visitor.visit_unit(),
            Value::Boolean(v) => visitor.visit_bool(v),
            Value::Integer(v) => visitor.visit_i32(v),
            Value::BigInteger(v) => visitor.visit_i64(v),
            Value::Double(v) => visitor.visit_f64(v),
            Value::String(v) => visitor.visit_string(v),
            Value::Base64(v) => visitor.visit_byte_buf(v),
            Value::DateTime(v) => visitor.visit_string(datetime_to_wire(&v)),
            Value::Array(v) => visitor.visit_seq(ArrayAccess {
                iter: v.into_iter(),
            }),
            Value::Struct(v) => visitor.visit_map(StructAccess {
                iter: v.into_iter(),
                value: None,
            }),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self {
            Value::Nil => visitor.visit_none(),
            value => visitor.visit_some(value),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self {
            Value::String(variant) => visitor.visit_enum(VariantValue {
                variant,
                fields: None,
            }),
            Value::Struct(mut members) => {
                let variant = match members.shift_remove("variant") {
                    Some(Value::String(variant)) => variant,
                    Some(other) => {
                        return Err(Error::UnexpectedType {
                            expected: "string",
                            found: other.type_name(),
                        })
                    }
                    None => return Err(Error::Message("missing field `variant`".into())),
                };
                let fields = members.shift_remove("fields");
                visitor.visit_enum(VariantValue { variant, fields })
            }
            other => Err(Error::UnexpectedType {
                expected: "string or struct",
                found: other.type_name(),
            }),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}

struct ArrayAccess {
    iter: std::vec::IntoIter<Value>,
}

impl<'de> SeqAccess<'de> for ArrayAccess {
    type Error = Error;

    fn next_element_seed<T: de::DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        match self.iter.next() {
            Some(value) => seed.deserialize(value).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct StructAccess {
    iter: <Struct as IntoIterator>::IntoIter,
    value: Option<Value>,
}

impl<'de> MapAccess<'de> for StructAccess {
    type Error = Error;

    fn next_key_seed<K: de::DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.iter.next() {
            Some((name, value)) => {
                self.value = Some(value);
                seed.deserialize(Value::String(name)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: de::DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        match self.value.take() {
            Some(value) => seed.deserialize(value),
            None => Err(Error::Message("value requested before key".into())),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct VariantValue {
    variant: String,
    fields: Option<Value>,
}

impl<'de> EnumAccess<'de> for VariantValue {
    type Error = Error;
    type Variant = VariantFields;

    fn variant_seed<V: de::DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, VariantFields)> {
        let name: de::value::StringDeserializer<Error> = self.variant.into_deserializer();
        let variant = seed.deserialize(name)?;
        Ok((variant, VariantFields { fields: self.fields }))
    }
}

struct VariantFields {
    fields: Option<Value>,
}

impl VariantFields {
    fn array(self) -> Result<Vec<Value>> {
        match self.fields {
            Some(Value::Array(elements)) => Ok(elements),
            Some(other) => Err(Error::UnexpectedType {
                expected: "array",
                found: other.type_name(),
            }),
            None => Err(Error::Message("missing field `fields`".into())),
        }
    }
}

impl<'de> VariantAccess<'de> for VariantFields {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.fields {
            None | Some(Value::Nil) => Ok(()),
            Some(other) => Err(Error::UnexpectedType {
                expected: "unit variant",
                found: other.type_name(),
            }),
        }
    }

    fn newtype_variant_seed<T: de::DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        let mut elements = self.array()?;
        if elements.len() != 1 {
            return Err(de::Error::invalid_length(elements.len(), &"one field"));
        }
        seed.deserialize(elements.remove(0))
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        let elements = self.array()?;
        visitor.visit_seq(ArrayAccess {
            iter: elements.into_iter(),
        })
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.fields {
            Some(Value::Struct(members)) => visitor.visit_map(StructAccess {
                iter: members.into_iter(),
                value: None,
            }),
            Some(other) => Err(Error::UnexpectedType {
                expected: "struct",
                found: other.type_name(),
            }),
            None => Err(Error::Message("missing field `fields`".into())),
        }
    }
}
