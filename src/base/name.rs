//! Domain names and their wire encoding.
//!
//! A [`Name`] keeps the presentation format, i.e., labels separated by
//! dots without the trailing dot. The wire format is the usual sequence
//! of length-prefixed labels terminated by a zero octet. Parsing follows
//! RFC 1035 compression pointers, encoding never emits them.

use core::fmt;
use core::str::FromStr;
use std::error;

use bytes::{BufMut, BytesMut};

use super::wire::{ParseError, Parser};

/// The maximum length of a single label in octets.
const MAX_LABEL_LEN: usize = 63;

/// The maximum number of compression pointers we are willing to follow.
///
/// A legitimate message needs far fewer; this only exists to cut pointer
/// loops short.
const MAX_POINTER_JUMPS: usize = 64;

//------------ Name ----------------------------------------------------------

/// A domain name in presentation format.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Name(String);

impl Name {
    /// Creates the root name.
    pub fn root() -> Self {
        Default::default()
    }

    /// Returns whether this is the root name.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the presentation format of the name without trailing dot.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the length of the wire representation in octets.
    pub fn wire_len(&self) -> usize {
        if self.is_root() {
            1
        } else {
            self.0.len() + 2
        }
    }

    /// Appends the wire representation of the name to `target`.
    pub(crate) fn compose(&self, target: &mut BytesMut) {
        if !self.is_root() {
            for label in self.0.split('.') {
                // Label length is validated on construction.
                target.put_u8(label.len() as u8);
                target.put_slice(label.as_bytes());
            }
        }
        target.put_u8(0);
    }

    /// Takes a name from the parser, following compression pointers.
    ///
    /// The parser is left positioned directly behind the name as it
    /// appears in the message, regardless of where pointers led.
    pub(crate) fn parse(parser: &mut Parser<'_>) -> Result<Self, ParseError> {
        let mut name = String::new();
        let mut return_pos = None;
        let mut jumps = 0;
        loop {
            let len = parser.parse_u8()?;
            if len == 0 {
                break;
            }
            if len & 0xC0 == 0xC0 {
                if jumps >= MAX_POINTER_JUMPS {
                    return Err(ParseError::PointerLoop);
                }
                jumps += 1;
                let target = usize::from(len & 0x3F) << 8
                    | usize::from(parser.parse_u8()?);
                if return_pos.is_none() {
                    return_pos = Some(parser.pos());
                }
                parser.seek(target)?;
                continue;
            }
            if len & 0xC0 != 0 {
                return Err(ParseError::BadLabel);
            }
            let label = parser.parse_octets(usize::from(len))?;
            if !name.is_empty() {
                name.push('.');
            }
            for &octet in label {
                // Presentation format; non-ASCII octets are escaped the
                // blunt way rather than lost.
                if octet.is_ascii_graphic() && octet != b'.' {
                    name.push(char::from(octet));
                } else {
                    name.push_str(&format!("\\{:03}", octet));
                }
            }
        }
        if let Some(pos) = return_pos {
            parser.seek(pos)?;
        }
        Ok(Name(name))
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_suffix('.').unwrap_or(s);
        if s.is_empty() {
            return Ok(Self::root());
        }
        for label in s.split('.') {
            if label.is_empty() {
                return Err(NameError::EmptyLabel);
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(NameError::LongLabel);
            }
        }
        Ok(Name(s.to_string()))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            f.write_str(&self.0)
        }
    }
}

//------------ NameError -----------------------------------------------------

/// An error happened while constructing a domain name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameError {
    /// A label was empty.
    EmptyLabel,

    /// A label was longer than 63 octets.
    LongLabel,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::EmptyLabel => write!(f, "empty label in domain name"),
            NameError::LongLabel => {
                write!(f, "label longer than 63 octets in domain name")
            }
        }
    }
}

impl error::Error for NameError {}

//============ Tests =========================================================
