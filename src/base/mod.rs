//! The DNS message model.
//!
//! This module contains the types that make up a DNS message: the
//! [`Header`] with its flags and section counts, [`Name`]s, question and
//! resource records, and the [`Message`] itself, together with the wire
//! codec that turns messages into octets and back. Record data is kept
//! opaque; interpreting it is not this crate's business.

#![warn(missing_docs)]

pub mod header;
pub mod iana;
pub mod message;
pub mod name;
pub mod wire;

pub use self::header::{Header, HeaderCounts};
pub use self::message::{Message, Question, Record};
pub use self::name::Name;
