// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

use std::error::Error as StdError;
use std::fmt;

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::xmlrpc::dom::{Document, Element};
use crate::xmlrpc::encoding;
use crate::xmlrpc::value::{Struct, Value};

pub const UNKNOWN_ERROR: i32 = 404;
/// Input to the response loader was neither text nor a document.
pub const INVALID_RESPONSE_INPUT: i32 = 650;
/// Response XML was not well-formed.
pub const RESPONSE_PARSE_FAILED: i32 = 651;
/// Response root carries neither `<params>` nor `<fault>`.
pub const INVALID_RESPONSE: i32 = 652;
/// `<params>` without a usable `<param><value>`.
pub const INVALID_RESPONSE_VALUE: i32 = 653;

/// Returns the built-in message for a protocol-internal fault code.
pub fn internal_message(code: i32) -> Option<&'static str> {
    let message = match code {
        404 => "Unknown Error",

        // reflection
        610 => "Invalid method class",
        611 => "Unable to attach function or callback; not callable",
        612 => "Unable to load array; not an array",
        613 => "One or more method records are corrupt or otherwise unusable",

        // dispatch
        620 => "Method does not exist",
        621 => "Error instantiating class to invoke method",
        622 => "Method missing implementation",
        623 => "Calling parameters do not match signature",

        // request
        630 => "Unable to read request",
        631 => "Failed to parse request",
        632 => "Invalid request, no method passed; request must contain a 'methodName' tag",
        633 => "Param must contain a value",
        634 => "Invalid method name",
        635 => "Invalid XML provided to request",
        636 => "Error creating xmlrpc value",

        // system.*
        640 => "Method does not exist",

        // response
        650 => "Invalid XML provided for response",
        651 => "Failed to parse response",
        652 => "Invalid response",
        653 => "Invalid XMLRPC value in response",
        _ => return None,
    };
    Some(message)
}

/// A protocol-level error: a numeric code and a message.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Fault {
    code: i32,
    message: String,
}

impl Fault {
    /// A zero code becomes 404 and an empty message is taken from the
    /// built-in table.
    pub fn new(code: i32, message: &str) -> Fault {
        let code = if code == 0 { UNKNOWN_ERROR } else { code };
        let message = if message.is_empty() {
            internal_message(code)
                .or_else(|| internal_message(UNKNOWN_ERROR))
                .unwrap_or_default()
                .to_string()
        } else {
            message.to_string()
        };
        Fault { code, message }
    }

    /// A fault carrying the built-in message for `code`.
    pub fn internal(code: i32) -> Fault {
        Fault::new(code, "")
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The `{faultCode, faultString}` struct carried on the wire.
    pub fn to_value(&self) -> Value {
        let mut members = Struct::new();
        members.insert("faultCode".to_string(), Value::Integer(self.code));
        members.insert("faultString".to_string(), Value::String(self.message.clone()));
        Value::Struct(members)
    }

    pub fn from_value(value: &Value) -> Result<Fault> {
        let members = value.as_struct().ok_or(Error::UnexpectedType {
            expected: "struct",
            found: value.type_name(),
        })?;

        let code = match members.get("faultCode") {
            None => None,
            Some(code) => Some(code.as_i32().ok_or(Error::InvalidFault("faultCode is not an int"))?),
        };
        let message = match members.get("faultString") {
            None => None,
            Some(message) => {
                Some(message.as_str().ok_or(Error::InvalidFault("faultString is not a string"))?)
            }
        };
        if code.is_none() && message.is_none() {
            return Err(Error::InvalidFault("fault code and string required"));
        }

        Ok(Fault::new(code.unwrap_or(0), message.unwrap_or("")))
    }

    /// Reads the fault out of a `<fault>` element.
    pub fn from_element(element: &Element) -> Result<Fault> {
        let value = element
            .child("value")
            .ok_or(Error::InvalidFault("<fault> must contain a <value>"))?;
        Fault::from_value(&encoding::decode(value)?)
    }

    /// Parses a fault `methodResponse` document.
    pub fn load_xml(xml: &str) -> Result<Fault> {
        let document = Document::parse(xml)?;
        let fault = document
            .root()
            .child("fault")
            .ok_or(Error::InvalidFault("document has no <fault>"))?;
        Fault::from_element(fault)
    }

    /// True when `xml` is a well-formed fault response.
    pub fn is_fault(xml: &str) -> bool {
        Fault::load_xml(xml).is_ok()
    }

    /// The complete fault `methodResponse` document.
    pub fn save_xml(&self, config: &GeneratorConfig) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"{}\"?>\n{}",
            config.encoding(),
            self.envelope(config)
        )
    }

    pub(crate) fn envelope(&self, config: &GeneratorConfig) -> String {
        format!(
            "<methodResponse><fault>{}</fault></methodResponse>",
            encoding::encode(&self.to_value(), config)
        )
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "fault {}: {}", self.code, self.message)
    }
}

impl StdError for Fault {}
