//! Low-level wire format plumbing.
//!
//! [`Parser`] walks the octets of a received message, [`FrameDecoder`]
//! reassembles the 2-octet length-prefixed frames used by stream
//! transports from however many partial deliveries the network produces.

use core::fmt;
use std::error;

use bytes::{Buf, Bytes, BytesMut};

//------------ Parser --------------------------------------------------------

/// A cursor over the octets of a DNS message.
///
/// The parser keeps the whole message around so that domain name
/// compression pointers can be followed.
#[derive(Clone, Copy, Debug)]
pub struct Parser<'a> {
    /// The octets of the entire message.
    octets: &'a [u8],

    /// The current read position.
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser positioned at the start of `octets`.
    pub fn new(octets: &'a [u8]) -> Self {
        Self { octets, pos: 0 }
    }

    /// Returns the current read position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the number of octets left to parse.
    pub fn remaining(&self) -> usize {
        self.octets.len() - self.pos
    }

    /// Moves the read position to `pos`.
    pub fn seek(&mut self, pos: usize) -> Result<(), ParseError> {
        if pos > self.octets.len() {
            return Err(ParseError::ShortInput);
        }
        self.pos = pos;
        Ok(())
    }

    /// Takes a single octet.
    pub fn parse_u8(&mut self) -> Result<u8, ParseError> {
        let octets = self.parse_octets(1)?;
        Ok(octets[0])
    }

    /// Takes a big-endian 16 bit integer.
    pub fn parse_u16(&mut self) -> Result<u16, ParseError> {
        let octets = self.parse_octets(2)?;
        Ok(u16::from_be_bytes([octets[0], octets[1]]))
    }

    /// Takes a big-endian 32 bit integer.
    pub fn parse_u32(&mut self) -> Result<u32, ParseError> {
        let octets = self.parse_octets(4)?;
        Ok(u32::from_be_bytes([
            octets[0], octets[1], octets[2], octets[3],
        ]))
    }

    /// Takes the next `len` octets.
    pub fn parse_octets(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        if len > self.remaining() {
            return Err(ParseError::ShortInput);
        }
        let octets = &self.octets[self.pos..self.pos + len];
        self.pos += len;
        Ok(octets)
    }
}

//------------ FrameDecoder --------------------------------------------------

/// Incremental decoder for length-prefixed stream frames.
///
/// Stream transports prefix each DNS message with its length as a
/// big-endian 16 bit integer. Data arrives in arbitrary chunks, so the
/// decoder buffers octets until at least the two length octets are
/// present, and then until the declared number of payload octets is
/// present. No parse is attempted before that point.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Octets received so far, length prefix stripped once read.
    buf: BytesMut,

    /// The declared payload length, once the prefix has been read.
    expected: Option<usize>,
}

impl FrameDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Gives access to the buffer for reading into.
    pub fn buf_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Appends a chunk of received octets.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk)
    }

    /// Returns the payload of the frame if it is complete.
    ///
    /// Returns `None` while octets are still missing. Once a full frame
    /// has been buffered, returns its payload and leaves any surplus
    /// octets in the buffer for the next frame.
    pub fn complete_frame(&mut self) -> Option<Bytes> {
        if self.expected.is_none() {
            if self.buf.len() < 2 {
                return None;
            }
            let len = u16::from_be_bytes([self.buf[0], self.buf[1]]);
            self.buf.advance(2);
            self.expected = Some(usize::from(len));
        }
        let len = self.expected?;
        if self.buf.len() < len {
            return None;
        }
        self.expected = None;
        Some(self.buf.split_to(len).freeze())
    }
}

//------------ ParseError ----------------------------------------------------

/// An error happened while parsing a message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The message ended before all declared content was read.
    ShortInput,

    /// A domain name label had an undefined type.
    BadLabel,

    /// A sequence of compression pointers did not terminate.
    PointerLoop,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::ShortInput => write!(f, "unexpected end of input"),
            ParseError::BadLabel => write!(f, "undefined label type"),
            ParseError::PointerLoop => {
                write!(f, "compression pointer loop")
            }
        }
    }
}

impl error::Error for ParseError {}

//------------ ComposeError --------------------------------------------------

/// An error happened while serializing a message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComposeError {
    /// The record data was longer than 65,535 octets.
    LongRdata,

    /// The assembled message exceeded the stream frame size limit.
    LongMessage,
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::LongRdata => {
                write!(f, "record data exceeds 65535 octets")
            }
            ComposeError::LongMessage => {
                write!(f, "message exceeds 65535 octets")
            }
        }
    }
}

impl error::Error for ComposeError {}

//============ Tests =========================================================
