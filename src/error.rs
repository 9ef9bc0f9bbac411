use std::fmt;

use serde::{de, ser};
use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised while turning text into a document tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input bytes are not text in any supported encoding.
    #[error("input is not text in a supported encoding ({0})")]
    Undecodable(String),
    /// A `<!DOCTYPE` or `<!ENTITY` declaration was found.
    #[error("document type and entity declarations are not allowed")]
    Doctype,
    /// The underlying reader rejected the document.
    #[error("malformed xml: {0}")]
    Xml(#[from] xml::reader::Error),
    /// The document ended without a root element.
    #[error("document has no root element")]
    NoRootElement,
    /// Elements nested beyond the accepted depth.
    #[error("elements nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Failures raised while decoding a `<value>` element.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The element handed to the decoder is not `<value>`.
    #[error("expected a <value> element, found <{0}>")]
    NotAValue(String),
    /// The typed child element is not part of the type system.
    #[error("unsupported value type <{0}>")]
    UnknownType(String),
    /// More than one typed element inside one `<value>`.
    #[error("<value> holds more than one typed element")]
    MultipleTypes,
    /// Scalar text does not parse as the declared type.
    #[error("invalid {kind} content {text:?}")]
    InvalidScalar {
        /// Wire tag of the scalar.
        kind: &'static str,
        /// Offending text.
        text: String,
    },
    /// `<array>` without `<data>`.
    #[error("<array> must contain a <data> element")]
    MissingData,
    /// An element that does not belong where it was found.
    #[error("unexpected <{found}> inside <{parent}>")]
    UnexpectedElement {
        /// Enclosing element.
        parent: &'static str,
        /// Offending child element.
        found: String,
    },
    /// `<member>` lacking its `<name>` or `<value>`.
    #[error("<member> is missing its <{0}>")]
    IncompleteMember(&'static str),
}

/// Errors of the fault loader and the serde bridge.
#[derive(Debug, Error)]
pub enum Error {
    /// Free-form message raised through serde.
    #[error("{0}")]
    Message(String),
    /// Document could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Value could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Integer outside the range of `<i8>`.
    #[error("integer {0} does not fit a 64-bit XML-RPC integer")]
    IntegerOverflow(u64),
    /// Map keys must be representable as struct member names.
    #[error("struct member names must be strings")]
    KeyMustBeString,
    /// The value tree does not have the expected shape.
    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        /// What the caller asked for.
        expected: &'static str,
        /// What the tree holds.
        found: &'static str,
    },
    /// A `<fault>` envelope that does not carry a usable fault struct.
    #[error("invalid fault: {0}")]
    InvalidFault(&'static str),
}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
