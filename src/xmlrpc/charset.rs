// Copyright 2014-2015 Galen Clark Haynes
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

// Rust XML-RPC library

use std::fmt::{self, Write};
use std::sync::LazyLock;

use regex::bytes::Regex;

static DECLARED_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^<\?xml\s[^>]*?encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
        .expect("encoding declaration pattern is valid")
});

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Character sets the codec can transcode.
///
/// Labels that are not recognized map to `Unknown`, which is assumed to be an
/// ASCII superset: output escapes every non-ASCII character so the bytes stay
/// valid whatever the label actually names, and input is read back as ASCII.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Charset {
    Utf8,
    Latin1,
    Ascii,
    Unknown,
}

impl Charset {
    pub fn from_label(label: &str) -> Charset {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Charset::Utf8,
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "latin-1" | "l1" => {
                Charset::Latin1
            }
            "us-ascii" | "ascii" => Charset::Ascii,
            _ => Charset::Unknown,
        }
    }

    pub fn can_represent(&self, c: char) -> bool {
        match *self {
            Charset::Utf8 => true,
            Charset::Latin1 => (c as u32) <= 0xFF,
            Charset::Ascii | Charset::Unknown => c.is_ascii(),
        }
    }

    /// Writes `s`, replacing characters this charset cannot hold with
    /// numeric character references. `s` must already be markup-escaped.
    pub fn write_escaped(&self, writer: &mut dyn Write, s: &str) -> fmt::Result {
        if *self == Charset::Utf8 {
            return writer.write_str(s);
        }
        for c in s.chars() {
            if self.can_represent(c) {
                writer.write_char(c)?;
            } else {
                write!(writer, "&#{};", c as u32)?;
            }
        }
        Ok(())
    }

    /// Transcodes text for the wire. Characters outside the charset are
    /// replaced by `?`; text produced by the encoder never contains any.
    pub fn encode(&self, s: &str) -> Vec<u8> {
        match *self {
            Charset::Utf8 => s.as_bytes().to_vec(),
            _ => s
                .chars()
                .map(|c| if self.can_represent(c) { c as u32 as u8 } else { b'?' })
                .collect(),
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match *self {
            Charset::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            Charset::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
            Charset::Ascii | Charset::Unknown => {
                if bytes.is_ascii() {
                    Some(bytes.iter().map(|&b| b as char).collect())
                } else {
                    None
                }
            }
        }
    }
}

/// Turns a raw document into text, honouring a UTF-8 byte order mark and the
/// encoding named by the XML declaration. Documents without a declaration
/// are UTF-8.
pub fn decode_document(bytes: &[u8]) -> Result<String, String> {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return std::str::from_utf8(rest)
            .map(str::to_string)
            .map_err(|e| e.to_string());
    }

    let label = DECLARED_ENCODING
        .captures(bytes)
        .and_then(|caps| caps.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned());

    let charset = match label {
        Some(ref label) => Charset::from_label(label),
        None => Charset::Utf8,
    };
    trace!("Decoding document as {:?} (declared: {:?})", charset, label);

    charset.decode(bytes).ok_or_else(|| match label {
        Some(label) => format!("bytes are not valid {}", label),
        None => "bytes are not valid UTF-8".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_case_insensitive() {
        assert_eq!(Charset::Utf8, Charset::from_label("utf-8"));
        assert_eq!(Charset::Latin1, Charset::from_label("ISO-8859-1"));
        assert_eq!(Charset::Ascii, Charset::from_label("US-ASCII"));
        assert_eq!(Charset::Unknown, Charset::from_label("KOI8-R"));
    }

    #[test]
    fn latin1_escapes_wide_characters() {
        let mut out = String::new();
        Charset::Latin1.write_escaped(&mut out, "caf\u{e9} \u{20ac}").unwrap();
        assert_eq!("caf\u{e9} &#8364;", out);
        assert_eq!(b"caf\xE9".to_vec(), Charset::Latin1.encode("caf\u{e9}"));
    }

    #[test]
    fn unknown_labels_escape_everything_beyond_ascii() {
        let mut out = String::new();
        Charset::Unknown.write_escaped(&mut out, "\u{e9}").unwrap();
        assert_eq!("&#233;", out);
    }

    #[test]
    fn documents_follow_their_declaration() {
        let latin1 = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>\xE9</a>";
        assert_eq!(
            "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>\u{e9}</a>",
            decode_document(latin1).unwrap()
        );

        let bom = b"\xEF\xBB\xBF<a/>";
        assert_eq!("<a/>", decode_document(bom).unwrap());

        assert!(decode_document(b"<a>\xFF\xFE</a>").is_err());
        assert_eq!(
            "<?xml version='1.0' encoding='KOI8-R'?><a/>",
            decode_document(b"<?xml version='1.0' encoding='KOI8-R'?><a/>").unwrap()
        );
        assert!(decode_document(b"<?xml version='1.0' encoding='KOI8-R'?><a>\xE9</a>").is_err());
    }
}
