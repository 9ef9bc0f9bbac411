//! XML-RPC message protocol layer.
//!
//! Converts [`Value`] trees to and from the XML-RPC wire format and reads and
//! writes `methodResponse` documents, fault variant included.
//!
//! ```
//! use xmlrpc_proto::{Response, Value};
//!
//! let mut response = Response::new();
//! let loaded = response.load_xml(
//!     "<methodResponse><params><param><value><int>42</int></value></param></params></methodResponse>",
//! );
//! assert!(loaded);
//! assert_eq!(Some(&Value::Integer(42)), response.return_value());
//!
//! assert!(!response.load_xml("foo"));
//! assert_eq!(Some(651), response.fault().map(|f| f.code()));
//! ```
//!
//! Parsing refuses DOCTYPE and entity declarations and never resolves
//! external entities.

#[macro_use]
extern crate log;

pub mod config;
pub mod error;
pub mod xmlrpc;

pub use config::{generator, set_default_encoding, set_generator, GeneratorConfig};
pub use error::{DecodeError, Error, ParseError, Result};
pub use xmlrpc::de::from_value;
pub use xmlrpc::dom::{Document, Element, Node};
pub use xmlrpc::encoding::{decode, decode_str, encode};
pub use xmlrpc::fault::Fault;
pub use xmlrpc::protocol::Response;
pub use xmlrpc::ser::to_value;
pub use xmlrpc::value::{Array, Struct, Value};
