// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

use std::fmt;

use crate::config::{self, GeneratorConfig, DEFAULT_ENCODING};
use crate::error::ParseError;
use crate::xmlrpc::dom::{Document, Element};
use crate::xmlrpc::encoding;
use crate::xmlrpc::fault::{
    Fault, INVALID_RESPONSE, INVALID_RESPONSE_INPUT, INVALID_RESPONSE_VALUE, RESPONSE_PARSE_FAILED,
};
use crate::xmlrpc::value::Value;

/// A `methodResponse`: either a return value or a fault, never both.
///
/// Loading never fails loudly. Every problem with the input ends up as a
/// [`Fault`] and a `false` return; see the `*_FAILED`/`INVALID_*` codes in
/// [`crate::xmlrpc::fault`].
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    return_value: Option<Value>,
    fault: Option<Fault>,
    encoding: String,
}

impl Default for Response {
    fn default() -> Self {
        Response::new()
    }
}

impl Response {
    pub fn new() -> Response {
        Response {
            return_value: None,
            fault: None,
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }

    pub fn with_return_value<T: Into<Value>>(value: T) -> Response {
        let mut response = Response::new();
        response.set_return_value(value);
        response
    }

    pub fn from_fault(fault: Fault) -> Response {
        let mut response = Response::new();
        response.set_fault(fault);
        response
    }

    pub fn set_return_value<T: Into<Value>>(&mut self, value: T) -> &mut Self {
        self.return_value = Some(value.into());
        self.fault = None;
        self
    }

    pub fn set_fault(&mut self, fault: Fault) -> &mut Self {
        self.fault = Some(fault);
        self.return_value = None;
        self
    }

    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }

    pub fn is_fault(&self) -> bool {
        self.fault.is_some()
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Sets the output encoding of this response and makes it the
    /// process-wide default for every later encode.
    pub fn set_encoding(&mut self, encoding: &str) -> &mut Self {
        self.encoding = encoding.to_string();
        config::set_default_encoding(encoding);
        self
    }

    /// Consumes the response. A response that was never loaded nor given a
    /// value reads as `Ok(Value::Nil)`.
    pub fn into_result(self) -> Result<Value, Fault> {
        match self.fault {
            Some(fault) => Err(fault),
            None => Ok(self.return_value.unwrap_or(Value::Nil)),
        }
    }

    /// Loads a `methodResponse` from text. Returns `true` when a return
    /// value was decoded; on `false` the fault explains why.
    pub fn load_xml(&mut self, xml: &str) -> bool {
        self.load_parsed(Document::parse(xml))
    }

    /// Loads a `methodResponse` from raw bytes, transcoded according to the
    /// document's declaration.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> bool {
        self.load_parsed(Document::parse_bytes(bytes))
    }

    /// Loads from a tree the caller already holds.
    pub fn load_document(&mut self, document: &Document) -> bool {
        self.load_root(document.root())
    }

    fn load_parsed(&mut self, parsed: Result<Document, ParseError>) -> bool {
        match parsed {
            Ok(document) => self.load_root(document.root()),
            Err(ParseError::Undecodable(reason)) => {
                debug!("Response input is not text: {}", reason);
                self.fail(INVALID_RESPONSE_INPUT)
            }
            Err(e) => {
                debug!("Response is not well-formed: {}", e);
                self.fail(RESPONSE_PARSE_FAILED)
            }
        }
    }

    fn load_root(&mut self, root: &Element) -> bool {
        if let Some(fault) = root.child("fault") {
            return match Fault::from_element(fault) {
                Ok(fault) => {
                    debug!("Server returned {}", fault);
                    self.set_fault(fault);
                    false
                }
                Err(e) => {
                    debug!("Unusable <fault> envelope: {}", e);
                    self.fail(INVALID_RESPONSE)
                }
            };
        }

        let params = match root.child("params") {
            Some(params) => params,
            None => {
                debug!("<{}> has neither <params> nor <fault>", root.name());
                return self.fail(INVALID_RESPONSE);
            }
        };

        let value = match single_child(params, "param").and_then(|param| single_child(param, "value")) {
            Some(value) => value,
            None => {
                debug!("<params> lacks a single <param><value>");
                return self.fail(INVALID_RESPONSE_VALUE);
            }
        };

        match encoding::decode(value) {
            Ok(value) => {
                trace!("Decoded return value of type {}", value.type_name());
                self.set_return_value(value);
                true
            }
            Err(e) => {
                debug!("Return value does not decode: {}", e);
                self.fail(INVALID_RESPONSE_VALUE)
            }
        }
    }

    fn fail(&mut self, code: i32) -> bool {
        self.set_fault(Fault::internal(code));
        false
    }

    /// The complete `methodResponse` document, in this response's encoding.
    ///
    /// A response holding neither a value nor a fault is written with a
    /// `<nil/>` return value, matching [`into_result`](Response::into_result);
    /// loading it back gives `Some(Value::Nil)`.
    pub fn save_xml(&self) -> String {
        let config = GeneratorConfig::new(&self.encoding);
        match self.fault {
            Some(ref fault) => fault.save_xml(&config),
            None => {
                let value = self.return_value.as_ref().unwrap_or(&Value::Nil);
                format!(
                    "<?xml version=\"1.0\" encoding=\"{}\"?>\n\
                     <methodResponse><params><param>{}</param></params></methodResponse>",
                    config.encoding(),
                    encoding::encode(value, &config)
                )
            }
        }
    }

    /// [`save_xml`](Response::save_xml) transcoded to this response's encoding.
    pub fn save_xml_bytes(&self) -> Vec<u8> {
        GeneratorConfig::new(&self.encoding)
            .charset()
            .encode(&self.save_xml())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.save_xml())
    }
}

fn single_child<'a>(parent: &'a Element, name: &str) -> Option<&'a Element> {
    let mut children = parent.elements().filter(|element| element.name() == name);
    match (children.next(), children.next()) {
        (Some(child), None) => Some(child),
        _ => None,
    }
}
