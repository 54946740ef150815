//! Queries, request building and the executor trait.

#![warn(missing_docs)]

use std::fmt::{self, Debug};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::base::iana::{Class, Rtype};
use crate::base::{Message, Name, Question};
use crate::client::error::Error;

//------------ Query ---------------------------------------------------------

/// A user-level request for records of a given type and class.
///
/// The `id` is a caller-supplied correlation value used by upstream
/// fallback and retry logic to report which lookup failed. It is not the
/// wire transaction ID; that one is chosen freshly for every
/// transmission attempt.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Query {
    /// The domain name to ask about.
    name: Name,

    /// The requested record type.
    qtype: Rtype,

    /// The requested class.
    qclass: Class,

    /// The caller-supplied correlation ID.
    id: u64,
}

impl Query {
    /// Creates a new query.
    pub fn new(name: Name, qtype: Rtype, qclass: Class, id: u64) -> Self {
        Self {
            name,
            qtype,
            qclass,
            id,
        }
    }

    /// Returns the domain name to ask about.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the requested record type.
    pub fn qtype(&self) -> Rtype {
        self.qtype
    }

    /// Returns the requested class.
    pub fn qclass(&self) -> Class {
        self.qclass
    }

    /// Returns the caller-supplied correlation ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns a cancellation error naming this query.
    pub(crate) fn cancelled(&self) -> Error {
        Error::Cancelled {
            name: self.name.to_string(),
        }
    }
}

//------------ QueryExecutor -------------------------------------------------

/// The capability to execute a DNS query against a nameserver.
///
/// The pipeline is built from values implementing this single trait:
/// transport executors at the bottom, resilience decorators wrapped
/// around them by plain constructor injection. The returned future
/// terminates with exactly one outcome; observing `token` at every
/// suspension point is how cancellation propagates down to the innermost
/// socket, connection, or timer.
pub trait QueryExecutor: Send + Sync {
    /// Executes `query` against the nameserver at `server`.
    fn query<'a>(
        &'a self,
        server: SocketAddr,
        query: &'a Query,
        token: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<Message, Error>> + Send + 'a>>;
}

impl<T: QueryExecutor + ?Sized> QueryExecutor for &T {
    fn query<'a>(
        &'a self,
        server: SocketAddr,
        query: &'a Query,
        token: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<Message, Error>> + Send + 'a>>
    {
        (**self).query(server, query, token)
    }
}

impl<T: QueryExecutor + ?Sized> QueryExecutor for Box<T> {
    fn query<'a>(
        &'a self,
        server: SocketAddr,
        query: &'a Query,
        token: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<Message, Error>> + Send + 'a>>
    {
        (**self).query(server, query, token)
    }
}

impl<T: QueryExecutor + ?Sized> QueryExecutor for Arc<T> {
    fn query<'a>(
        &'a self,
        server: SocketAddr,
        query: &'a Query,
        token: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<Message, Error>> + Send + 'a>>
    {
        (**self).query(server, query, token)
    }
}

//------------ IdSource ------------------------------------------------------

/// A source of wire transaction IDs.
///
/// The ID generator is a component dependency so that tests can supply
/// deterministic IDs; production use wants [`RandomIds`].
pub trait IdSource: Send + Sync {
    /// Returns the transaction ID for the next transmission attempt.
    fn next_id(&self) -> u16;
}

/// The default ID source: uniformly random IDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&self) -> u16 {
        rand::random()
    }
}

//------------ RequestBuilder ------------------------------------------------

/// Builds a wire request message for a query.
///
/// Every call produces a fresh message with a newly drawn transaction ID
/// so that retries and transport fallbacks never reuse an ID, in line
/// with the protocol's ID-matching rule.
#[derive(Clone)]
pub struct RequestBuilder {
    /// Where transaction IDs come from.
    ids: Arc<dyn IdSource>,
}

impl RequestBuilder {
    /// Creates a builder drawing random transaction IDs.
    pub fn new() -> Self {
        Self::with_ids(Arc::new(RandomIds))
    }

    /// Creates a builder drawing transaction IDs from `ids`.
    pub fn with_ids(ids: Arc<dyn IdSource>) -> Self {
        Self { ids }
    }

    /// Builds the request message for `query`.
    ///
    /// The message carries a fresh transaction ID, the recursion-desired
    /// flag, exactly one question derived from the query, and section
    /// counts that match the sections.
    pub fn build(&self, query: &Query) -> Message {
        let mut msg = Message::new();
        msg.header_mut().set_id(self.ids.next_id());
        msg.header_mut().set_rd(true);
        msg.push_question(Question::new(
            query.name().clone(),
            query.qtype(),
            query.qclass(),
        ));
        msg.prepare();
        msg
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder").finish_non_exhaustive()
    }
}

/// Checks whether `reply` is an answer to the request message `request`.
///
/// The reply must have the QR bit set and carry the transaction ID of
/// the request.
pub(crate) fn is_answer(reply: &Message, request: &Message) -> bool {
    reply.header().qr() && reply.header().id() == request.header().id()
}

//============ Tests =========================================================
