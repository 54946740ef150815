//! DNS messages and their sections.

use bytes::{BufMut, Bytes, BytesMut};

use super::header::{Header, HeaderCounts};
use super::iana::{Class, Rtype};
use super::name::Name;
use super::wire::{ComposeError, ParseError, Parser};

//------------ Question ------------------------------------------------------

/// A question record: what is being asked for.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Question {
    /// The domain name being asked about.
    qname: Name,

    /// The requested record type.
    qtype: Rtype,

    /// The requested class.
    qclass: Class,
}

impl Question {
    /// Creates a new question.
    pub fn new(qname: Name, qtype: Rtype, qclass: Class) -> Self {
        Self {
            qname,
            qtype,
            qclass,
        }
    }

    /// Returns the domain name being asked about.
    pub fn qname(&self) -> &Name {
        &self.qname
    }

    /// Returns the requested record type.
    pub fn qtype(&self) -> Rtype {
        self.qtype
    }

    /// Returns the requested class.
    pub fn qclass(&self) -> Class {
        self.qclass
    }

    /// Returns the length of the wire representation in octets.
    fn wire_len(&self) -> usize {
        self.qname.wire_len() + 4
    }

    /// Appends the wire representation of the question to `target`.
    fn compose(&self, target: &mut BytesMut) {
        self.qname.compose(target);
        target.put_u16(self.qtype.to_int());
        target.put_u16(self.qclass.to_int());
    }

    /// Takes a question from the parser.
    fn parse(parser: &mut Parser<'_>) -> Result<Self, ParseError> {
        Ok(Self {
            qname: Name::parse(parser)?,
            qtype: Rtype::from_int(parser.parse_u16()?),
            qclass: Class::from_int(parser.parse_u16()?),
        })
    }
}

//------------ Record --------------------------------------------------------

/// A resource record.
///
/// The record data is kept as raw octets; interpreting it per record
/// type is outside the scope of this crate.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Record {
    /// The owner name of the record.
    name: Name,

    /// The record type.
    rtype: Rtype,

    /// The class of the record.
    class: Class,

    /// The time this record may be cached, in seconds.
    ttl: u32,

    /// The raw record data.
    rdata: Bytes,
}

impl Record {
    /// Creates a new record.
    pub fn new(
        name: Name,
        rtype: Rtype,
        class: Class,
        ttl: u32,
        rdata: Bytes,
    ) -> Self {
        Self {
            name,
            rtype,
            class,
            ttl,
            rdata,
        }
    }

    /// Returns the owner name of the record.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the record type.
    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    /// Returns the class of the record.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns the time this record may be cached, in seconds.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Returns the raw record data.
    pub fn rdata(&self) -> &Bytes {
        &self.rdata
    }

    /// Returns the length of the wire representation in octets.
    fn wire_len(&self) -> usize {
        self.name.wire_len() + 10 + self.rdata.len()
    }

    /// Appends the wire representation of the record to `target`.
    fn compose(&self, target: &mut BytesMut) -> Result<(), ComposeError> {
        let rdlen = u16::try_from(self.rdata.len())
            .map_err(|_| ComposeError::LongRdata)?;
        self.name.compose(target);
        target.put_u16(self.rtype.to_int());
        target.put_u16(self.class.to_int());
        target.put_u32(self.ttl);
        target.put_u16(rdlen);
        target.put_slice(&self.rdata);
        Ok(())
    }

    /// Takes a record from the parser.
    fn parse(parser: &mut Parser<'_>) -> Result<Self, ParseError> {
        let name = Name::parse(parser)?;
        let rtype = Rtype::from_int(parser.parse_u16()?);
        let class = Class::from_int(parser.parse_u16()?);
        let ttl = parser.parse_u32()?;
        let rdlen = parser.parse_u16()?;
        let rdata =
            Bytes::copy_from_slice(parser.parse_octets(usize::from(rdlen))?);
        Ok(Self {
            name,
            rtype,
            class,
            ttl,
            rdata,
        })
    }
}

//------------ Message -------------------------------------------------------

/// A DNS message, either a request or a response.
///
/// A message is assembled section by section and must have
/// [`prepare`][Self::prepare] applied before serialization so that the
/// header counts match the sections. Responses are produced whole by
/// [`from_bytes`][Self::from_bytes].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Message {
    /// The ID and flags of the message.
    header: Header,

    /// The section counts of the message.
    counts: HeaderCounts,

    /// The question section.
    questions: Vec<Question>,

    /// The answer section.
    answers: Vec<Record>,

    /// The authority section.
    authority: Vec<Record>,

    /// The additional section.
    additional: Vec<Record>,
}

impl Message {
    /// Creates a new, empty message.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the header of the message.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns a mutable reference to the header of the message.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Returns the section counts of the message.
    ///
    /// For a parsed message these are the counts as they appeared on the
    /// wire. For a message under construction they lag behind the
    /// sections until [`prepare`][Self::prepare] is called.
    pub fn counts(&self) -> &HeaderCounts {
        &self.counts
    }

    /// Returns the question section.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Returns the answer section.
    pub fn answers(&self) -> &[Record] {
        &self.answers
    }

    /// Returns the authority section.
    pub fn authority(&self) -> &[Record] {
        &self.authority
    }

    /// Returns the additional section.
    pub fn additional(&self) -> &[Record] {
        &self.additional
    }

    /// Appends a question record.
    pub fn push_question(&mut self, question: Question) {
        self.questions.push(question)
    }

    /// Appends an answer record.
    pub fn push_answer(&mut self, record: Record) {
        self.answers.push(record)
    }

    /// Appends an authority record.
    pub fn push_authority(&mut self, record: Record) {
        self.authority.push(record)
    }

    /// Appends an additional record.
    pub fn push_additional(&mut self, record: Record) {
        self.additional.push(record)
    }

    /// Synchronizes the header counts with the section lengths.
    ///
    /// Must be called before serializing a message that was assembled
    /// via the `push_*` methods.
    pub fn prepare(&mut self) {
        self.counts.set_qdcount(section_count(self.questions.len()));
        self.counts.set_ancount(section_count(self.answers.len()));
        self.counts.set_nscount(section_count(self.authority.len()));
        self.counts.set_arcount(section_count(self.additional.len()));
    }

    /// Serializes the message into its wire representation.
    ///
    /// Names are emitted without compression. Fails if the message would
    /// not fit into a stream frame.
    pub fn to_bytes(&self) -> Result<Bytes, ComposeError> {
        let len = 12
            + self.questions.iter().map(Question::wire_len).sum::<usize>()
            + self
                .answers
                .iter()
                .chain(&self.authority)
                .chain(&self.additional)
                .map(Record::wire_len)
                .sum::<usize>();
        if len > usize::from(u16::MAX) {
            return Err(ComposeError::LongMessage);
        }
        let mut target = BytesMut::with_capacity(len);
        self.header.compose(&mut target);
        self.counts.compose(&mut target);
        for question in &self.questions {
            question.compose(&mut target);
        }
        for record in self
            .answers
            .iter()
            .chain(&self.authority)
            .chain(&self.additional)
        {
            record.compose(&mut target)?;
        }
        Ok(target.freeze())
    }

    /// Parses a message from its wire representation.
    ///
    /// Octets trailing the declared sections are ignored.
    pub fn from_bytes(octets: &[u8]) -> Result<Self, ParseError> {
        let mut parser = Parser::new(octets);
        let header = Header::parse(&mut parser)?;
        let counts = HeaderCounts::parse(&mut parser)?;
        let mut questions = Vec::with_capacity(counts.qdcount().into());
        for _ in 0..counts.qdcount() {
            questions.push(Question::parse(&mut parser)?);
        }
        let mut sections: [Vec<Record>; 3] =
            [Vec::new(), Vec::new(), Vec::new()];
        for (section, count) in sections.iter_mut().zip([
            counts.ancount(),
            counts.nscount(),
            counts.arcount(),
        ]) {
            for _ in 0..count {
                section.push(Record::parse(&mut parser)?);
            }
        }
        let [answers, authority, additional] = sections;
        Ok(Self {
            header,
            counts,
            questions,
            answers,
            authority,
            additional,
        })
    }
}

/// Converts a section length into a header count.
fn section_count(len: usize) -> u16 {
    // A section this long cannot be serialized anyway; the count is
    // capped so that prepare itself cannot fail.
    u16::try_from(len).unwrap_or(u16::MAX)
}

//============ Tests =========================================================
