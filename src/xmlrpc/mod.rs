// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

#![deny(non_camel_case_types)]

//! XML-RPC value codec and `methodResponse` handling
//!
//! # What is XML-RPC?
//!
//! A remote procedure call protocol carrying typed values in XML documents.
//!
//! Basic documentation found on Wikipedia
//! http://en.wikipedia.org/wiki/XML-RPC
//!
//! Full specification of the XML-RPC protocol is found here:
//! http://xmlrpc.scripting.com/spec.html
//!
//! Additional errata and hints can be found here:
//! http://effbot.org/zone/xmlrpc-errata.htm
//!
//! The `<nil/>` and `<i8>` extensions are understood, with or without the
//! `ex:` namespace prefix.

pub mod charset;
pub mod de;
pub mod dom;
pub mod encoding;
pub mod fault;
pub mod protocol;
pub mod ser;
pub mod value;
