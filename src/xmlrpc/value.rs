// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use time::PrimitiveDateTime;

pub type Array = Vec<Value>;

/// Struct members in insertion order. Inserting an existing name replaces
/// its value without moving it.
pub type Struct = IndexMap<String, Value>;

/// Represents an XML-RPC data value
#[derive(Clone, PartialEq, Debug)]
pub enum Value {
    /// `<nil/>` extension.
    Nil,
    Boolean(bool),
    /// `<int>` / `<i4>`, the only integer the base protocol knows.
    Integer(i32),
    /// `<i8>` extension.
    BigInteger(i64),
    Double(f64),
    String(String),
    Base64(Vec<u8>),
    /// `<dateTime.iso8601>`; the wire format carries no zone and whole
    /// seconds only. Build it with `From`, which drops the fraction, so that
    /// it survives an encode/decode round trip.
    DateTime(PrimitiveDateTime),
    Array(Array),
    Struct(Struct),
}

impl Value {
    pub fn base64<B: Into<Vec<u8>>>(bytes: B) -> Value {
        Value::Base64(bytes.into())
    }

    /// Wire tag of the variant.
    pub fn type_name(&self) -> &'static str {
        match *self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "int",
            Value::BigInteger(_) => "i8",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Base64(_) => "base64",
            Value::DateTime(_) => "dateTime.iso8601",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
        }
    }

    /// If the value is a Struct, returns the member called `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match *self {
            Value::Struct(ref members) => members.get(key),
            _ => None,
        }
    }

    /// Follows `keys` through nested structs.
    pub fn find_path(&self, keys: &[&str]) -> Option<&Value> {
        let mut target = self;
        for key in keys {
            target = target.get(key)?;
        }
        Some(target)
    }

    /// Depth-first search through nested structs for a member called `key`.
    pub fn search(&self, key: &str) -> Option<&Value> {
        match *self {
            Value::Struct(ref members) => members
                .get(key)
                .or_else(|| members.values().find_map(|v| v.search(key))),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(*self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Boolean(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::Integer(n) => Some(n),
            Value::BigInteger(n) => i32::try_from(n).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Integer(n) => Some(i64::from(n)),
            Value::BigInteger(n) => Some(n),
            _ => None,
        }
    }

    /// Doubles, and integers widened to a double.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Integer(n) => Some(f64::from(n)),
            Value::BigInteger(n) => Some(n as f64),
            Value::Double(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Value::String(ref s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match *self {
            Value::Base64(ref bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<PrimitiveDateTime> {
        match *self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match *self {
            Value::Array(ref array) => Some(array),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match *self {
            Value::Struct(ref members) => Some(members),
            _ => None,
        }
    }
}

macro_rules! from_impl_integer {
    ($($t:ty), +) => (
        $(impl From<$t> for Value {
            fn from(n: $t) -> Value { Value::Integer(i32::from(n)) }
        })+
    )
}

from_impl_integer! { i8, i16, i32, u8, u16 }

macro_rules! from_impl_wide_integer {
    ($($t:ty), +) => (
        $(impl From<$t> for Value {
            fn from(n: $t) -> Value {
                match i32::try_from(n) {
                    Ok(n) => Value::Integer(n),
                    Err(_) => Value::BigInteger(i64::from(n)),
                }
            }
        })+
    )
}

from_impl_wide_integer! { i64, u32 }

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Boolean(b)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Value {
        Value::Double(f64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Value {
        Value::Double(n)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Value {
        Value::Nil
    }
}

impl From<char> for Value {
    fn from(c: char) -> Value {
        Value::String(c.to_string())
    }
}

impl<'a> From<&'a str> for Value {
    fn from(s: &'a str) -> Value {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(s)
    }
}

impl From<PrimitiveDateTime> for Value {
    fn from(dt: PrimitiveDateTime) -> Value {
        // zero is always a valid nanosecond
        Value::DateTime(dt.replace_nanosecond(0).unwrap_or(dt))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Value {
        match value {
            None => Value::Nil,
            Some(value) => value.into(),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(elements: Vec<T>) -> Value {
        Value::Array(elements.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<IndexMap<String, T>> for Value {
    fn from(members: IndexMap<String, T>) -> Value {
        Value::Struct(members.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(members: BTreeMap<String, T>) -> Value {
        Value::Struct(members.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

// Iteration order of a HashMap is unspecified, and so is the member order.
impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(members: HashMap<String, T>) -> Value {
        Value::Struct(members.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

macro_rules! tuple_impl {
    // use variables to indicate the arity of the tuple
    ($($tyvar:ident),* ) => {
        impl<$( $tyvar: Into<Value> ),*> From<( $( $tyvar ),* , )> for Value {
            #[allow(non_snake_case)]
            fn from(tuple: ( $( $tyvar ),* , )) -> Value {
                let ($($tyvar),*,) = tuple;
                Value::Array(vec![$($tyvar.into()),*])
            }
        }
    }
}

tuple_impl! {A}
tuple_impl! {A, B}
tuple_impl! {A, B, C}
tuple_impl! {A, B, C, D}
tuple_impl! {A, B, C, D, E}
tuple_impl! {A, B, C, D, E, F}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Value {
        Value::Array(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Value {
        Value::Struct(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_integers_pick_the_smallest_wire_type() {
        assert_eq!(Value::Integer(7), Value::from(7i64));
        assert_eq!(Value::BigInteger(1 << 40), Value::from(1i64 << 40));
        assert_eq!(Value::BigInteger(u32::MAX as i64), Value::from(u32::MAX));
    }

    #[test]
    fn options_map_to_nil() {
        assert_eq!(Value::Nil, Value::from(None::<i32>));
        assert_eq!(Value::String("x".into()), Value::from(Some("x")));
    }

    #[test]
    fn tuples_and_vectors_become_arrays() {
        assert_eq!(
            Value::Array(vec![Value::Integer(1), Value::String("two".into()), Value::Boolean(true)]),
            Value::from((1, "two", true))
        );
        assert_eq!(Some(3), Value::from(vec![1, 2, 3]).as_array().map(Vec::len));
    }

    #[test]
    fn struct_lookup() {
        let inner: Value = vec![("depth", Value::from(2))].into_iter().collect();
        let outer: Value = vec![("name", Value::from("top")), ("inner", inner)]
            .into_iter()
            .collect();

        assert_eq!(Some("top"), outer.get("name").and_then(Value::as_str));
        assert_eq!(Some(2), outer.find_path(&["inner", "depth"]).and_then(Value::as_i32));
        assert_eq!(Some(&Value::Integer(2)), outer.search("depth"));
        assert_eq!(None, outer.get("missing"));
        assert_eq!(None, Value::from(1).get("name"));
    }

    #[test]
    fn struct_insert_keeps_position() {
        let mut members = Struct::new();
        members.insert("a".to_string(), Value::from(1));
        members.insert("b".to_string(), Value::from(2));
        members.insert("a".to_string(), Value::from(3));
        let keys: Vec<&str> = members.keys().map(String::as_str).collect();
        assert_eq!(vec!["a", "b"], keys);
        assert_eq!(Some(&Value::Integer(3)), members.get("a"));
    }

    #[test]
    fn numeric_accessors_widen() {
        assert_eq!(Some(2.0), Value::Integer(2).as_f64());
        assert_eq!(Some(5), Value::BigInteger(5).as_i32());
        assert_eq!(None, Value::BigInteger(1 << 40).as_i32());
        assert_eq!(None, Value::String("1".into()).as_i64());
    }
}
