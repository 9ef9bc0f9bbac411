// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

//! Minimal element tree built on top of the `xml-rs` pull parser.
//!
//! The parser is configured once in [`parser_config`]: unknown entity
//! references are errors and nothing is ever fetched. Documents carrying a
//! `<!DOCTYPE` are refused: a scan of the prolog catches the plain case
//! before the reader runs, and the reader's own record of a document type
//! is checked before the root element is accepted. No declared entity is
//! ever referenced, since references can only follow the root start tag.

use std::sync::LazyLock;

use regex::Regex;
use xml::reader::{EventReader, ParserConfig, XmlEvent};

use crate::error::ParseError;
use crate::xmlrpc::charset;

/// Deepest element nesting accepted from untrusted input.
pub const MAX_DEPTH: usize = 1024;

static ROOT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^?!]").expect("root pattern is valid"));
static DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!\s*(DOCTYPE|ENTITY)").expect("doctype pattern is valid"));

/// A node of the tree: an element or a run of character data.
#[derive(Clone, PartialEq, Debug)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its local name and ordered children. Attributes and
/// namespaces play no part in XML-RPC and are dropped.
#[derive(Clone, PartialEq, Debug)]
pub struct Element {
    name: String,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str) -> Element {
        Element {
            name: name.to_string(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: Element) -> Element {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Element {
        self.push_text(text);
        self
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Appends character data, merging it with a trailing text node.
    pub fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Node::Text(text.to_string()));
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |element| element.name == name)
    }

    /// First child element called `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// Concatenated character data of the direct children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let Node::Text(text) = node {
                out.push_str(text);
            }
        }
        out
    }

    /// True when some direct text child holds more than whitespace.
    pub fn has_significant_text(&self) -> bool {
        self.children.iter().any(|node| match node {
            Node::Text(text) => !text.trim().is_empty(),
            Node::Element(_) => false,
        })
    }
}

/// A parsed document.
#[derive(Clone, PartialEq, Debug)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn parse(text: &str) -> Result<Document, ParseError> {
        let body = strip_declaration(text);
        reject_declarations(body)?;

        let mut reader = EventReader::new_with_config(body.as_bytes(), parser_config());
        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            match reader.next()? {
                XmlEvent::StartElement { name, .. } => {
                    if stack.is_empty() && reader.doctype().is_some() {
                        debug!("Refusing document with a DOCTYPE declaration");
                        return Err(ParseError::Doctype);
                    }
                    if stack.len() >= MAX_DEPTH {
                        debug!("Refusing document nested deeper than {}", MAX_DEPTH);
                        return Err(ParseError::TooDeep(MAX_DEPTH));
                    }
                    stack.push(Element::new(&name.local_name));
                }
                XmlEvent::EndElement { .. } => {
                    let element = stack.pop().ok_or(ParseError::NoRootElement)?;
                    match stack.last_mut() {
                        Some(parent) => parent.push_child(element),
                        None => root = Some(element),
                    }
                }
                XmlEvent::Characters(text)
                | XmlEvent::Whitespace(text)
                | XmlEvent::CData(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&text);
                    }
                }
                XmlEvent::EndDocument => break,
                _ => {}
            }
        }

        root.map(|root| Document { root })
            .ok_or(ParseError::NoRootElement)
    }

    /// Parses raw bytes, transcoding them according to their declaration.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Document, ParseError> {
        let text = charset::decode_document(bytes).map_err(ParseError::Undecodable)?;
        Document::parse(&text)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }
}

impl From<Element> for Document {
    fn from(root: Element) -> Document {
        Document { root }
    }
}

/// The hardened reader configuration shared by every parse.
fn parser_config() -> ParserConfig {
    ParserConfig::new()
        .trim_whitespace(false)
        .whitespace_to_characters(true)
        .cdata_to_characters(true)
        .coalesce_characters(true)
        .ignore_comments(true)
        .replace_unknown_entity_references(false)
}

// The text is already decoded; a stale encoding declaration must not make
// the reader reinterpret it.
fn strip_declaration(text: &str) -> &str {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let is_declaration = text.starts_with("<?xml")
        && text[5..].starts_with(|c: char| c.is_ascii_whitespace());
    if !is_declaration {
        return text;
    }
    match text.find("?>") {
        Some(end) => &text[end + 2..],
        None => text,
    }
}

fn reject_declarations(text: &str) -> Result<(), ParseError> {
    let prolog = match ROOT_START.find(text) {
        Some(root) => &text[..root.start()],
        None => text,
    };
    if DECLARATION.is_match(prolog) {
        debug!("Refusing document with a DOCTYPE or ENTITY declaration");
        return Err(ParseError::Doctype);
    }
    Ok(())
}
