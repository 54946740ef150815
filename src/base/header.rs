//! The header of a DNS message.
//!
//! Each DNS message starts with a twelve octet header: four octets of
//! message ID and flags followed by the four section counts. Since
//! changing the counts may invalidate the rest of the message while the
//! flags can be modified freely, the header is split into two types:
//! [`Header`] for the ID and flags and [`HeaderCounts`] for the counts.

use bytes::{BufMut, BytesMut};

use super::iana::{Opcode, Rcode};
use super::wire::{ParseError, Parser};

//------------ Header --------------------------------------------------------

/// The ID and flags of a DNS message.
///
/// The four octets are kept in wire representation:
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      ID                       |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA|    Z   |   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Header {
    /// The wire representation of ID and flags.
    inner: [u8; 4],
}

impl Header {
    /// Creates a new header with all fields zero.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the value of the ID field.
    ///
    /// The ID matches a response to its request. Requests should use a
    /// fresh, unpredictable ID for every transmission attempt.
    pub fn id(self) -> u16 {
        u16::from_be_bytes([self.inner[0], self.inner[1]])
    }

    /// Sets the value of the ID field.
    pub fn set_id(&mut self, value: u16) {
        self.inner[..2].copy_from_slice(&value.to_be_bytes())
    }

    /// Returns whether the QR bit is set.
    ///
    /// The bit is clear in queries and set in responses.
    pub fn qr(self) -> bool {
        self.get_bit(2, 7)
    }

    /// Sets the QR bit.
    pub fn set_qr(&mut self, set: bool) {
        self.set_bit(2, 7, set)
    }

    /// Returns the opcode.
    pub fn opcode(self) -> Opcode {
        Opcode::from_int((self.inner[2] >> 3) & 0x0F)
    }

    /// Sets the opcode.
    pub fn set_opcode(&mut self, opcode: Opcode) {
        self.inner[2] = (self.inner[2] & 0x87) | (opcode.to_int() << 3);
    }

    /// Returns whether the AA (authoritative answer) bit is set.
    pub fn aa(self) -> bool {
        self.get_bit(2, 2)
    }

    /// Sets the AA bit.
    pub fn set_aa(&mut self, set: bool) {
        self.set_bit(2, 2, set)
    }

    /// Returns whether the TC (truncated) bit is set.
    ///
    /// A set bit means the full response did not fit into the transport
    /// used and the sections were cut short.
    pub fn tc(self) -> bool {
        self.get_bit(2, 1)
    }

    /// Sets the TC bit.
    pub fn set_tc(&mut self, set: bool) {
        self.set_bit(2, 1, set)
    }

    /// Returns whether the RD (recursion desired) bit is set.
    pub fn rd(self) -> bool {
        self.get_bit(2, 0)
    }

    /// Sets the RD bit.
    pub fn set_rd(&mut self, set: bool) {
        self.set_bit(2, 0, set)
    }

    /// Returns whether the RA (recursion available) bit is set.
    pub fn ra(self) -> bool {
        self.get_bit(3, 7)
    }

    /// Sets the RA bit.
    pub fn set_ra(&mut self, set: bool) {
        self.set_bit(3, 7, set)
    }

    /// Returns the response code.
    pub fn rcode(self) -> Rcode {
        Rcode::from_int(self.inner[3] & 0x0F)
    }

    /// Sets the response code.
    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.inner[3] = (self.inner[3] & 0xF0) | rcode.to_int();
    }

    /// Returns the bit at `bit` of the octet at `offset`.
    fn get_bit(self, offset: usize, bit: usize) -> bool {
        self.inner[offset] & (1 << bit) != 0
    }

    /// Sets or clears the bit at `bit` of the octet at `offset`.
    fn set_bit(&mut self, offset: usize, bit: usize, set: bool) {
        if set {
            self.inner[offset] |= 1 << bit
        } else {
            self.inner[offset] &= !(1 << bit)
        }
    }

    /// Takes the header from the beginning of a message.
    pub(crate) fn parse(parser: &mut Parser<'_>) -> Result<Self, ParseError> {
        let octets = parser.parse_octets(4)?;
        let mut inner = [0u8; 4];
        inner.copy_from_slice(octets);
        Ok(Self { inner })
    }

    /// Appends the wire representation of the header to `target`.
    pub(crate) fn compose(&self, target: &mut BytesMut) {
        target.put_slice(&self.inner)
    }
}

//------------ HeaderCounts --------------------------------------------------

/// The section counts of a DNS message.
///
/// These must equal the lengths of the corresponding record sections
/// before a message is serialized; [`Message::prepare`] takes care of
/// that.
///
/// [`Message::prepare`]: super::message::Message::prepare
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct HeaderCounts {
    /// The number of question records.
    qdcount: u16,

    /// The number of answer records.
    ancount: u16,

    /// The number of authority records.
    nscount: u16,

    /// The number of additional records.
    arcount: u16,
}

impl HeaderCounts {
    /// Creates a new value with all counts zero.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the number of question records.
    pub fn qdcount(self) -> u16 {
        self.qdcount
    }

    /// Sets the number of question records.
    pub fn set_qdcount(&mut self, value: u16) {
        self.qdcount = value
    }

    /// Returns the number of answer records.
    pub fn ancount(self) -> u16 {
        self.ancount
    }

    /// Sets the number of answer records.
    pub fn set_ancount(&mut self, value: u16) {
        self.ancount = value
    }

    /// Returns the number of authority records.
    pub fn nscount(self) -> u16 {
        self.nscount
    }

    /// Sets the number of authority records.
    pub fn set_nscount(&mut self, value: u16) {
        self.nscount = value
    }

    /// Returns the number of additional records.
    pub fn arcount(self) -> u16 {
        self.arcount
    }

    /// Sets the number of additional records.
    pub fn set_arcount(&mut self, value: u16) {
        self.arcount = value
    }

    /// Takes the section counts from the message header.
    pub(crate) fn parse(parser: &mut Parser<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            qdcount: parser.parse_u16()?,
            ancount: parser.parse_u16()?,
            nscount: parser.parse_u16()?,
            arcount: parser.parse_u16()?,
        })
    }

    /// Appends the wire representation of the counts to `target`.
    pub(crate) fn compose(&self, target: &mut BytesMut) {
        target.put_u16(self.qdcount);
        target.put_u16(self.ancount);
        target.put_u16(self.nscount);
        target.put_u16(self.arcount);
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_bits() {
        let mut header = Header::new();
        assert!(!header.qr());
        header.set_qr(true);
        header.set_rd(true);
        header.set_tc(true);
        assert!(header.qr());
        assert!(header.rd());
        assert!(header.tc());
        assert!(!header.aa());
        assert!(!header.ra());
        header.set_tc(false);
        assert!(!header.tc());
        assert!(header.qr() && header.rd());
    }

    #[test]
    fn opcode_and_rcode_do_not_clobber_flags() {
        let mut header = Header::new();
        header.set_qr(true);
        header.set_rd(true);
        header.set_opcode(Opcode::STATUS);
        header.set_ra(true);
        header.set_rcode(Rcode::NXDOMAIN);
        assert!(header.qr());
        assert!(header.rd());
        assert!(header.ra());
        assert_eq!(header.opcode(), Opcode::STATUS);
        assert_eq!(header.rcode(), Rcode::NXDOMAIN);
    }

    #[test]
    fn wire_round_trip() {
        let mut header = Header::new();
        header.set_id(0x1234);
        header.set_qr(true);
        header.set_rd(true);
        header.set_rcode(Rcode::SERVFAIL);
        let mut target = BytesMut::new();
        header.compose(&mut target);
        assert_eq!(&target[..2], &[0x12, 0x34]);
        let mut parser = Parser::new(&target);
        let parsed = Header::parse(&mut parser).unwrap();
        assert_eq!(parsed, header);
    }
}
