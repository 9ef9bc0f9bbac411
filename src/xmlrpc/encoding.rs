// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

//! Value codec: [`Value`] trees to XML text and `<value>` elements back to
//! [`Value`] trees.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use time::macros::format_description;
use time::PrimitiveDateTime;

use crate::config::{self, GeneratorConfig};
use crate::error::{DecodeError, Result};
use crate::xmlrpc::charset::Charset;
use crate::xmlrpc::dom::{Document, Element};
use crate::xmlrpc::value::{Struct, Value};

use crate::error::DecodeError::*;

pub type EncodeResult = fmt::Result;
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

/// Shortcut function to encode a `Value` into an XML `String`, `<value>`
/// wrapper included.
pub fn encode(value: &Value, config: &GeneratorConfig) -> String {
    let mut s = String::new();
    {
        let mut encoder = Encoder::new(&mut s, config);
        // Writing into a String only fails on a formatting bug.
        let _ = encoder.emit_value(value);
    }
    s
}

/// Decodes a `<value>` element and everything below it.
pub fn decode(element: &Element) -> DecodeResult<Value> {
    if element.name() != "value" {
        return Err(NotAValue(element.name().to_string()));
    }

    let mut typed = element.elements();
    let inner = match typed.next() {
        // untyped values are strings
        None => return Ok(Value::String(element.text())),
        Some(inner) => inner,
    };
    if typed.next().is_some() || element.has_significant_text() {
        return Err(MultipleTypes);
    }
    decode_typed(inner)
}

/// Parses `xml`, whose root must be a `<value>` element, and decodes it.
pub fn decode_str(xml: &str) -> Result<Value> {
    let document = Document::parse(xml)?;
    Ok(decode(document.root())?)
}

fn escape_str(wr: &mut dyn fmt::Write, charset: Charset, v: &str) -> fmt::Result {
    charset.write_escaped(wr, &xml::escape::escape_str_pcdata(v))
}

fn format_datetime(dt: &PrimitiveDateTime) -> std::result::Result<String, time::error::Format> {
    dt.format(format_description!(
        "[year][month][day]T[hour]:[minute]:[second]"
    ))
}

fn parse_datetime(s: &str) -> Option<PrimitiveDateTime> {
    let compact = format_description!("[year][month][day]T[hour]:[minute]:[second]");
    let dashed = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(s, &compact)
        .or_else(|_| PrimitiveDateTime::parse(s, &dashed))
        .ok()
}

/// Wire form of a date-time, as written inside `<dateTime.iso8601>`.
pub fn datetime_to_wire(dt: &PrimitiveDateTime) -> String {
    // A PrimitiveDateTime always has every component the format names.
    format_datetime(dt).unwrap_or_default()
}

/// A structure for writing XML-RPC values.
pub struct Encoder<'a> {
    writer: &'a mut (dyn fmt::Write + 'a),
    charset: Charset,
}

impl<'a> Encoder<'a> {
    /// Creates a new XML-RPC encoder whose output will be written to the writer
    /// specified, escaped for the encoding `config` names.
    pub fn new(writer: &'a mut dyn fmt::Write, config: &GeneratorConfig) -> Encoder<'a> {
        Encoder {
            writer,
            charset: config.charset(),
        }
    }

    pub fn emit_value(&mut self, value: &Value) -> EncodeResult {
        write!(self.writer, "<value>")?;
        match *value {
            Value::Nil => self.emit_nil()?,
            Value::Boolean(v) => self.emit_bool(v)?,
            Value::Integer(v) => self.emit_i32(v)?,
            Value::BigInteger(v) => self.emit_i64(v)?,
            Value::Double(v) => self.emit_f64(v)?,
            Value::String(ref v) => self.emit_str(v)?,
            Value::Base64(ref v) => self.emit_base64(v)?,
            Value::DateTime(ref v) => self.emit_datetime(v)?,
            Value::Array(ref v) => self.emit_array(v)?,
            Value::Struct(ref v) => self.emit_struct(v)?,
        }
        write!(self.writer, "</value>")
    }

    fn emit_nil(&mut self) -> EncodeResult {
        write!(self.writer, "<nil/>")
    }

    fn emit_bool(&mut self, v: bool) -> EncodeResult {
        write!(self.writer, "<boolean>{}</boolean>", v as u8)
    }

    fn emit_i32(&mut self, v: i32) -> EncodeResult {
        write!(self.writer, "<int>{}</int>", v)
    }

    fn emit_i64(&mut self, v: i64) -> EncodeResult {
        write!(self.writer, "<i8>{}</i8>", v)
    }

    fn emit_f64(&mut self, v: f64) -> EncodeResult {
        write!(self.writer, "<double>{}</double>", v)
    }

    fn emit_str(&mut self, v: &str) -> EncodeResult {
        write!(self.writer, "<string>")?;
        escape_str(self.writer, self.charset, v)?;
        write!(self.writer, "</string>")
    }

    fn emit_base64(&mut self, v: &[u8]) -> EncodeResult {
        write!(self.writer, "<base64>{}</base64>", STANDARD.encode(v))
    }

    fn emit_datetime(&mut self, v: &PrimitiveDateTime) -> EncodeResult {
        let wire = format_datetime(v).map_err(|_| fmt::Error)?;
        write!(self.writer, "<dateTime.iso8601>{}</dateTime.iso8601>", wire)
    }

    fn emit_array(&mut self, v: &[Value]) -> EncodeResult {
        write!(self.writer, "<array><data>")?;
        for element in v {
            self.emit_value(element)?;
        }
        write!(self.writer, "</data></array>")
    }

    fn emit_struct(&mut self, v: &Struct) -> EncodeResult {
        write!(self.writer, "<struct>")?;
        for (name, value) in v {
            write!(self.writer, "<member><name>")?;
            escape_str(self.writer, self.charset, name)?;
            write!(self.writer, "</name>")?;
            self.emit_value(value)?;
            write!(self.writer, "</member>")?;
        }
        write!(self.writer, "</struct>")
    }
}

fn decode_typed(element: &Element) -> DecodeResult<Value> {
    match element.name() {
        "i4" | "int" => parse_scalar(element, "int", |s| s.trim().parse().ok()).map(Value::Integer),
        "i8" => parse_scalar(element, "i8", |s| s.trim().parse().ok()).map(Value::BigInteger),
        "double" => parse_scalar(element, "double", |s| s.trim().parse().ok()).map(Value::Double),
        "boolean" => parse_scalar(element, "boolean", |s| match s.trim() {
            "0" => Some(false),
            "1" => Some(true),
            _ => None,
        })
        .map(Value::Boolean),
        "string" => parse_scalar(element, "string", |s| Some(s.to_string())).map(Value::String),
        "base64" => parse_scalar(element, "base64", |s| {
            let packed: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            STANDARD.decode(packed).ok()
        })
        .map(Value::Base64),
        "dateTime.iso8601" => {
            parse_scalar(element, "dateTime.iso8601", |s| parse_datetime(s.trim())).map(Value::DateTime)
        }
        "nil" => parse_scalar(element, "nil", |s| if s.trim().is_empty() { Some(()) } else { None })
            .map(|_| Value::Nil),
        "array" => decode_array(element),
        "struct" => decode_struct(element),
        other => Err(UnknownType(other.to_string())),
    }
}

fn parse_scalar<T, F>(element: &Element, kind: &'static str, parse: F) -> DecodeResult<T>
where
    F: FnOnce(&str) -> Option<T>,
{
    if let Some(child) = element.elements().next() {
        return Err(UnexpectedElement {
            parent: kind,
            found: child.name().to_string(),
        });
    }
    let text = element.text();
    match parse(&text) {
        Some(v) => Ok(v),
        None => Err(InvalidScalar { kind, text }),
    }
}

fn decode_array(element: &Element) -> DecodeResult<Value> {
    let mut data = None;
    for child in element.elements() {
        match child.name() {
            "data" if data.is_none() => data = Some(child),
            _ => {
                return Err(UnexpectedElement {
                    parent: "array",
                    found: child.name().to_string(),
                })
            }
        }
    }
    let data = data.ok_or(MissingData)?;

    let mut values = Vec::new();
    for child in data.elements() {
        if child.name() != "value" {
            return Err(UnexpectedElement {
                parent: "data",
                found: child.name().to_string(),
            });
        }
        values.push(decode(child)?);
    }
    Ok(Value::Array(values))
}

fn decode_struct(element: &Element) -> DecodeResult<Value> {
    let mut members = Struct::new();
    for member in element.elements() {
        if member.name() != "member" {
            return Err(UnexpectedElement {
                parent: "struct",
                found: member.name().to_string(),
            });
        }

        let mut name = None;
        let mut value = None;
        for part in member.elements() {
            match part.name() {
                "name" if name.is_none() => name = Some(part.text()),
                "value" if value.is_none() => value = Some(part),
                _ => {
                    return Err(UnexpectedElement {
                        parent: "member",
                        found: part.name().to_string(),
                    })
                }
            }
        }
        let name = name.ok_or(IncompleteMember("name"))?;
        let value = value.ok_or(IncompleteMember("value"))?;
        members.insert(name, decode(value)?);
    }
    Ok(Value::Struct(members))
}

impl fmt::Display for Value {
    /// Encodes the value as XML with the process-wide generator settings.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let config = config::generator();
        let mut encoder = Encoder::new(f, &config);
        encoder.emit_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn utf8() -> GeneratorConfig {
        GeneratorConfig::default()
    }

    fn round_trip(value: &Value) -> Value {
        let xml = encode(value, &utf8());
        decode_str(&xml).unwrap()
    }

    #[test]
    fn test_encode_scalars() {
        let config = utf8();
        assert_eq!("<value><nil/></value>", encode(&Value::Nil, &config));
        assert_eq!("<value><boolean>1</boolean></value>", encode(&Value::Boolean(true), &config));
        assert_eq!("<value><int>-42</int></value>", encode(&Value::Integer(-42), &config));
        assert_eq!("<value><i8>8589934592</i8></value>", encode(&Value::BigInteger(1 << 33), &config));
        assert_eq!("<value><double>4.2</double></value>", encode(&Value::Double(4.2), &config));
        assert_eq!(
            "<value><string>a &lt;b&gt; &amp; c</string></value>",
            encode(&Value::from("a <b> & c"), &config)
        );
        assert_eq!("<value><base64>aGVsbG8=</base64></value>", encode(&Value::base64("hello"), &config));
        assert_eq!(
            "<value><dateTime.iso8601>19980717T14:08:55</dateTime.iso8601></value>",
            encode(&Value::DateTime(datetime!(1998-07-17 14:08:55)), &config)
        );
    }

    #[test]
    fn test_encode_compound_in_order() {
        let value: Value = vec![
            ("zeta", Value::from(1)),
            ("alpha", Value::from(vec!["x", "y"])),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            "<value><struct>\
             <member><name>zeta</name><value><int>1</int></value></member>\
             <member><name>alpha</name><value><array><data>\
             <value><string>x</string></value><value><string>y</string></value>\
             </data></array></value></member>\
             </struct></value>",
            encode(&value, &utf8())
        );
    }

    #[test]
    fn test_encode_escapes_for_target_encoding() {
        let value = Value::from("\u{e9}\u{20ac}");
        assert_eq!(
            "<value><string>\u{e9}&#8364;</string></value>",
            encode(&value, &GeneratorConfig::new("ISO-8859-1"))
        );
        assert_eq!(
            "<value><string>&#233;&#8364;</string></value>",
            encode(&value, &GeneratorConfig::new("US-ASCII"))
        );
        assert_eq!(
            value,
            decode_str(&encode(&value, &GeneratorConfig::new("US-ASCII"))).unwrap()
        );
    }

    #[test]
    fn test_round_trip_every_variant() {
        let mut members = Struct::new();
        members.insert("b".to_string(), Value::Nil);
        members.insert("a".to_string(), Value::from(vec![Value::from(1), Value::from(2.5)]));
        members.insert("c".to_string(), Value::Struct(Struct::new()));

        let value = Value::Array(vec![
            Value::Nil,
            Value::Boolean(false),
            Value::Integer(i32::MIN),
            Value::BigInteger(i64::MAX),
            Value::Double(-0.125),
            Value::Double(1e300),
            Value::String("  padded  ".into()),
            Value::String(String::new()),
            Value::base64(vec![0u8, 255, 16]),
            Value::DateTime(datetime!(2024-02-29 23:59:59)),
            Value::Array(Vec::new()),
            Value::Struct(members),
        ]);

        let decoded = round_trip(&value);
        assert_eq!(value, decoded);

        let keys: Vec<&str> = decoded.as_array().unwrap()[11]
            .as_struct()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(vec!["b", "a", "c"], keys);
    }

    #[test]
    fn test_datetime_drops_fraction_on_construction() {
        let value = Value::from(datetime!(2024-01-01 0:00:00.5));
        assert_eq!(Value::DateTime(datetime!(2024-01-01 0:00:00)), value);
        assert_eq!(value, round_trip(&value));
    }

    #[test]
    fn test_non_finite_doubles_round_trip() {
        assert_eq!(Value::Double(f64::INFINITY), round_trip(&Value::Double(f64::INFINITY)));
        assert!(round_trip(&Value::Double(f64::NAN)).as_f64().unwrap().is_nan());
    }

    #[test]
    fn test_decode_untyped_value_is_string() {
        assert_eq!(Value::from(" plain "), decode_str("<value> plain </value>").unwrap());
        assert_eq!(Value::from(""), decode_str("<value/>").unwrap());
    }

    #[test]
    fn test_decode_aliases_and_extensions() {
        assert_eq!(Value::Integer(40), decode_str("<value><i4> 40 </i4></value>").unwrap());
        assert_eq!(Value::BigInteger(-5), decode_str("<value><i8>-5</i8></value>").unwrap());
        assert_eq!(
            Value::Nil,
            decode_str("<value xmlns:ex=\"http://ws.apache.org/xmlrpc/namespaces/extensions\"><ex:nil/></value>")
                .unwrap()
        );
        assert_eq!(
            Value::DateTime(datetime!(1998-07-17 14:08:55)),
            decode_str("<value><dateTime.iso8601>1998-07-17T14:08:55</dateTime.iso8601></value>").unwrap()
        );
        assert_eq!(
            Value::base64("hello world"),
            decode_str("<value><base64>aGVsbG8g\n  d29ybGQ=</base64></value>").unwrap()
        );
    }

    #[test]
    fn test_decode_nil_member() {
        let value = decode_str(
            "<value><struct>\
             <member><name>id</name><value><string>1</string></value></member>\
             <member><name>description</name><value><nil/></value></member>\
             </struct></value>",
        )
        .unwrap();
        assert_eq!(Some(&Value::from("1")), value.get("id"));
        assert_eq!(Some(&Value::Nil), value.get("description"));
        assert_eq!(None, value.get("missing"));
    }

    #[test]
    fn test_decode_rejects_malformed_scalars() {
        let cases = [
            "<value><int>abc</int></value>",
            "<value><int>2147483648</int></value>",
            "<value><boolean>true</boolean></value>",
            "<value><double></double></value>",
            "<value><base64>!!!</base64></value>",
            "<value><dateTime.iso8601>yesterday</dateTime.iso8601></value>",
            "<value><nil>x</nil></value>",
        ];
        for xml in cases.iter() {
            match decode_str(xml) {
                Err(crate::error::Error::Decode(InvalidScalar { .. })) => {}
                other => panic!("{} decoded to {:?}", xml, other),
            }
        }
    }

    #[test]
    fn test_decode_rejects_structural_errors() {
        let decode_err = |xml: &str| match decode_str(xml) {
            Err(crate::error::Error::Decode(e)) => e,
            other => panic!("{} decoded to {:?}", xml, other),
        };

        assert_eq!(UnknownType("float".into()), decode_err("<value><float>1</float></value>"));
        assert_eq!(MultipleTypes, decode_err("<value><int>1</int><int>2</int></value>"));
        assert_eq!(MultipleTypes, decode_err("<value>x<int>1</int></value>"));
        assert_eq!(MissingData, decode_err("<value><array/></value>"));
        assert_eq!(
            UnexpectedElement { parent: "data", found: "int".into() },
            decode_err("<value><array><data><int>1</int></data></array></value>")
        );
        assert_eq!(
            IncompleteMember("value"),
            decode_err("<value><struct><member><name>a</name></member></struct></value>")
        );
        assert_eq!(
            IncompleteMember("name"),
            decode_err("<value><struct><member><value>1</value></member></struct></value>")
        );
        assert_eq!(
            UnexpectedElement { parent: "string", found: "b".into() },
            decode_err("<value><string>a<b/>c</string></value>")
        );
        assert_eq!(NotAValue("param".into()), decode_err("<param><value/></param>"));
    }

    #[test]
    fn test_decode_deep_nesting() {
        let depth = 200;
        let xml = format!(
            "{}<value><int>7</int></value>{}",
            "<value><array><data>".repeat(depth),
            "</data></array></value>".repeat(depth)
        );
        let mut value = &decode_str(&xml).unwrap();
        for _ in 0..depth {
            value = &value.as_array().unwrap()[0];
        }
        assert_eq!(&Value::Integer(7), value);
    }

    #[test]
    fn test_display_uses_process_generator() {
        assert_eq!("<value><int>3</int></value>", Value::Integer(3).to_string());
    }
}
