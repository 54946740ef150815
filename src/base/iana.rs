//! Value types for the DNS parameter registries.
//!
//! These are transparent wrappers around the raw wire integers. Only the
//! values the pipeline itself comes across have named constants; anything
//! else round-trips as its integer value.

use core::fmt;

//------------ Rtype ---------------------------------------------------------

/// A resource record type code.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rtype(u16);

impl Rtype {
    /// A host address.
    pub const A: Rtype = Rtype(1);

    /// An authoritative name server.
    pub const NS: Rtype = Rtype(2);

    /// The canonical name for an alias.
    pub const CNAME: Rtype = Rtype(5);

    /// The start of a zone of authority.
    pub const SOA: Rtype = Rtype(6);

    /// A domain name pointer.
    pub const PTR: Rtype = Rtype(12);

    /// A mail exchange.
    pub const MX: Rtype = Rtype(15);

    /// Text strings.
    pub const TXT: Rtype = Rtype(16);

    /// An IPv6 host address.
    pub const AAAA: Rtype = Rtype(28);

    /// A service location.
    pub const SRV: Rtype = Rtype(33);

    /// A request for all records the server has available.
    pub const ANY: Rtype = Rtype(255);

    /// Creates a record type from its integer value.
    pub const fn from_int(value: u16) -> Self {
        Self(value)
    }

    /// Returns the integer value of the record type.
    pub const fn to_int(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Rtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Rtype::A => f.write_str("A"),
            Rtype::NS => f.write_str("NS"),
            Rtype::CNAME => f.write_str("CNAME"),
            Rtype::SOA => f.write_str("SOA"),
            Rtype::PTR => f.write_str("PTR"),
            Rtype::MX => f.write_str("MX"),
            Rtype::TXT => f.write_str("TXT"),
            Rtype::AAAA => f.write_str("AAAA"),
            Rtype::SRV => f.write_str("SRV"),
            Rtype::ANY => f.write_str("ANY"),
            Rtype(value) => write!(f, "TYPE{}", value),
        }
    }
}

//------------ Class ---------------------------------------------------------

/// A protocol class code.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Class(u16);

impl Class {
    /// The Internet.
    pub const IN: Class = Class(1);

    /// The Chaos network.
    pub const CH: Class = Class(3);

    /// Hesiod.
    pub const HS: Class = Class(4);

    /// Any class.
    pub const ANY: Class = Class(255);

    /// Creates a class from its integer value.
    pub const fn from_int(value: u16) -> Self {
        Self(value)
    }

    /// Returns the integer value of the class.
    pub const fn to_int(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Class::IN => f.write_str("IN"),
            Class::CH => f.write_str("CH"),
            Class::HS => f.write_str("HS"),
            Class::ANY => f.write_str("ANY"),
            Class(value) => write!(f, "CLASS{}", value),
        }
    }
}

//------------ Opcode --------------------------------------------------------

/// The opcode of a DNS message.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Opcode(u8);

impl Opcode {
    /// A standard query.
    pub const QUERY: Opcode = Opcode(0);

    /// An inverse query.
    pub const IQUERY: Opcode = Opcode(1);

    /// A server status request.
    pub const STATUS: Opcode = Opcode(2);

    /// A notify request.
    pub const NOTIFY: Opcode = Opcode(4);

    /// An update request.
    pub const UPDATE: Opcode = Opcode(5);

    /// Creates an opcode from its integer value.
    ///
    /// Only the low four bits are significant on the wire.
    pub const fn from_int(value: u8) -> Self {
        Self(value & 0x0F)
    }

    /// Returns the integer value of the opcode.
    pub const fn to_int(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Opcode::QUERY => f.write_str("QUERY"),
            Opcode::IQUERY => f.write_str("IQUERY"),
            Opcode::STATUS => f.write_str("STATUS"),
            Opcode::NOTIFY => f.write_str("NOTIFY"),
            Opcode::UPDATE => f.write_str("UPDATE"),
            Opcode(value) => write!(f, "OPCODE{}", value),
        }
    }
}

//------------ Rcode ---------------------------------------------------------

/// The response code of a DNS message.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rcode(u8);

impl Rcode {
    /// No error condition.
    pub const NOERROR: Rcode = Rcode(0);

    /// The server was unable to interpret the query.
    pub const FORMERR: Rcode = Rcode(1);

    /// The server ran into trouble processing the query.
    pub const SERVFAIL: Rcode = Rcode(2);

    /// The queried domain name does not exist.
    pub const NXDOMAIN: Rcode = Rcode(3);

    /// The server does not support this kind of query.
    pub const NOTIMP: Rcode = Rcode(4);

    /// The server refused to answer.
    pub const REFUSED: Rcode = Rcode(5);

    /// Creates a response code from its integer value.
    ///
    /// Only the low four bits are significant on the wire.
    pub const fn from_int(value: u8) -> Self {
        Self(value & 0x0F)
    }

    /// Returns the integer value of the response code.
    pub const fn to_int(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Rcode::NOERROR => f.write_str("NOERROR"),
            Rcode::FORMERR => f.write_str("FORMERR"),
            Rcode::SERVFAIL => f.write_str("SERVFAIL"),
            Rcode::NXDOMAIN => f.write_str("NXDOMAIN"),
            Rcode::NOTIMP => f.write_str("NOTIMP"),
            Rcode::REFUSED => f.write_str("REFUSED"),
            Rcode(value) => write!(f, "RCODE{}", value),
        }
    }
}
