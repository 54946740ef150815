//! Error type for the query pipeline.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::base::wire::{ComposeError, ParseError};

/// Error type for the query pipeline.
///
/// The variants map onto the pipeline's error taxonomy: cancellation and
/// timeouts carry the query name for diagnostics, server protocol
/// violations carry the nameserver, and I/O failures carry the
/// underlying error. The type is cheap to clone so that a terminal error
/// can be handed to several outstanding observers.
#[derive(Clone, Debug)]
pub enum Error {
    /// The server violated protocol expectations.
    ///
    /// Carries the offending nameserver and, where one exists, the
    /// underlying cause. A server that truncates a response over a
    /// stream transport ends up here with a
    /// [`TruncatedResponse`][Self::TruncatedResponse] cause.
    BadServer {
        /// The nameserver that misbehaved.
        server: SocketAddr,

        /// The underlying cause, if any.
        cause: Option<Box<Error>>,
    },

    /// The caller cancelled the query.
    Cancelled {
        /// The name the cancelled query asked about.
        name: String,
    },

    /// Serializing the request failed.
    Compose(ComposeError),

    /// The stream connection closed before a complete message arrived.
    ConnectionDropped,

    /// No transport is available to transmit the request.
    NoTransportAvailable,

    /// Parsing the response failed.
    Parse(ParseError),

    /// Sending over a datagram socket gave a partial result.
    ShortSend,

    /// Reading from a stream connection gave an error.
    StreamRead(Arc<std::io::Error>),

    /// Writing to a stream connection gave an error.
    StreamWrite(Arc<std::io::Error>),

    /// The query did not complete within the configured deadline.
    Timeout {
        /// The name the timed-out query asked about.
        name: String,
    },

    /// The socket or connection could not be established.
    TransportUnavailable(Arc<std::io::Error>),

    /// A datagram response arrived with the truncated flag set.
    ///
    /// Recoverable by re-issuing the query over a stream transport; the
    /// selective executor does exactly that.
    TruncatedResponse,

    /// Receiving from a datagram socket gave an error.
    UdpReceive(Arc<std::io::Error>),

    /// Sending over a datagram socket gave an error.
    UdpSend(Arc<std::io::Error>),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::BadServer { server, .. } => {
                write!(f, "server {} violated the DNS protocol", server)
            }
            Error::Cancelled { name } => {
                write!(f, "DNS query for {} has been cancelled", name)
            }
            Error::Compose(_) => write!(f, "error serializing request"),
            Error::ConnectionDropped => {
                write!(f, "connection to DNS server dropped unexpectedly")
            }
            Error::NoTransportAvailable => {
                write!(f, "no transport available")
            }
            Error::Parse(_) => write!(f, "error parsing response"),
            Error::ShortSend => {
                write!(f, "partial send to datagram socket")
            }
            Error::StreamRead(_) => {
                write!(f, "error reading from stream connection")
            }
            Error::StreamWrite(_) => {
                write!(f, "error writing to stream connection")
            }
            Error::Timeout { name } => {
                write!(f, "DNS query for {} timed out", name)
            }
            Error::TransportUnavailable(_) => {
                write!(f, "unable to reach DNS server")
            }
            Error::TruncatedResponse => {
                write!(f, "truncated response message received")
            }
            Error::UdpReceive(_) => {
                write!(f, "error receiving from datagram socket")
            }
            Error::UdpSend(_) => {
                write!(f, "error sending to datagram socket")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::BadServer { cause, .. } => {
                cause.as_deref().map(|cause| cause as _)
            }
            Error::Cancelled { .. } => None,
            Error::Compose(err) => Some(err),
            Error::ConnectionDropped => None,
            Error::NoTransportAvailable => None,
            Error::Parse(err) => Some(err),
            Error::ShortSend => None,
            Error::StreamRead(err) => Some(err),
            Error::StreamWrite(err) => Some(err),
            Error::Timeout { .. } => None,
            Error::TransportUnavailable(err) => Some(err),
            Error::TruncatedResponse => None,
            Error::UdpReceive(err) => Some(err),
            Error::UdpSend(err) => Some(err),
        }
    }
}
