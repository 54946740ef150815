//! The datagram transport executor.

#![warn(missing_docs)]

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::base::Message;
use crate::client::error::Error;
use crate::client::protocol::{Connect, DgramRecv, DgramSend};
use crate::client::request::{
    is_answer, Query, QueryExecutor, RequestBuilder,
};

/// Size of the buffer a response packet is received into.
///
/// Large enough for any answer a sane server sends over UDP; anything
/// bigger arrives truncated and is retried over a stream transport
/// anyway.
const RECV_SIZE: usize = 2000;

//------------ DgramExecutor -------------------------------------------------

/// A query executor performing a single UDP round trip.
///
/// One query, one socket, one packet out, one packet in. A response with
/// the truncated flag set is a failure here; deciding to fall back to a
/// stream transport is the selective executor's business, not this
/// one's.
#[derive(Clone, Debug)]
pub struct DgramExecutor<C> {
    /// Creates the datagram socket for each attempt.
    connect: C,

    /// Builds the wire request, one fresh message per attempt.
    builder: RequestBuilder,
}

impl<C> DgramExecutor<C> {
    /// Creates a new executor using `connect` for its sockets.
    pub fn new(connect: C) -> Self {
        Self::with_builder(connect, RequestBuilder::new())
    }

    /// Creates a new executor with an explicit request builder.
    pub fn with_builder(connect: C, builder: RequestBuilder) -> Self {
        Self { connect, builder }
    }
}

impl<C> DgramExecutor<C>
where
    C: Connect,
    C::Connection: DgramRecv + DgramSend + Send,
{
    /// Performs the round trip.
    ///
    /// The socket lives entirely within this function; every return
    /// path, cancellation included, closes it exactly once by dropping
    /// it.
    async fn query_impl(
        &self,
        server: SocketAddr,
        query: &Query,
        token: &CancellationToken,
    ) -> Result<Message, Error> {
        if token.is_cancelled() {
            return Err(query.cancelled());
        }
        let request = self.builder.build(query);
        let dgram = request.to_bytes().map_err(Error::Compose)?;

        let sock = tokio::select! {
            _ = token.cancelled() => return Err(query.cancelled()),
            res = self.connect.connect(server) => {
                res.map_err(|err| {
                    Error::TransportUnavailable(Arc::new(err))
                })?
            }
        };

        let sent = tokio::select! {
            _ = token.cancelled() => return Err(query.cancelled()),
            res = sock.send(&dgram) => {
                res.map_err(|err| Error::UdpSend(Arc::new(err)))?
            }
        };
        if sent != dgram.len() {
            return Err(Error::ShortSend);
        }

        let buf = tokio::select! {
            _ = token.cancelled() => return Err(query.cancelled()),
            res = sock.recv(vec![0; RECV_SIZE]) => {
                res.map_err(|err| Error::UdpReceive(Arc::new(err)))?
            }
        };
        drop(sock);

        let response = Message::from_bytes(&buf).map_err(Error::Parse)?;
        if !is_answer(&response, &request) {
            return Err(Error::BadServer {
                server,
                cause: None,
            });
        }
        if response.header().tc() {
            trace!(name = %query.name(), %server,
                "truncated datagram response");
            return Err(Error::TruncatedResponse);
        }
        Ok(response)
    }
}

impl<C> QueryExecutor for DgramExecutor<C>
where
    C: Connect,
    C::Connection: DgramRecv + DgramSend + Send,
{
    fn query<'a>(
        &'a self,
        server: SocketAddr,
        query: &'a Query,
        token: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<Message, Error>> + Send + 'a>>
    {
        Box::pin(self.query_impl(server, query, token))
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::iana::{Class, Rtype};
    use crate::client::request::IdSource;
    use std::future::{pending, ready};
    use std::io;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// An ID source that always hands out the same ID.
    struct StaticIds(u16);

    impl IdSource for StaticIds {
        fn next_id(&self) -> u16 {
            self.0
        }
    }

    /// A datagram socket answering every send with a canned packet.
    struct MockDgram {
        reply: Vec<u8>,
        sent: Arc<Mutex<Vec<Vec<u8>>>>,

        /// When set, receives stay pending forever.
        hang: bool,

        /// Set when the socket is dropped.
        closed: Arc<AtomicBool>,
    }

    impl Drop for MockDgram {
        fn drop(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    impl DgramRecv for MockDgram {
        type Fut = Pin<
            Box<dyn Future<Output = Result<Vec<u8>, io::Error>> + Send>,
        >;

        fn recv(&self, _buf: Vec<u8>) -> Self::Fut {
            if self.hang {
                Box::pin(pending())
            } else {
                Box::pin(ready(Ok(self.reply.clone())))
            }
        }
    }

    impl DgramSend for MockDgram {
        type Fut = std::future::Ready<Result<usize, io::Error>>;

        fn send(&self, buf: &[u8]) -> Self::Fut {
            self.sent.lock().unwrap().push(buf.to_vec());
            ready(Ok(buf.len()))
        }
    }

    /// A connect factory handing out [`MockDgram`]s, or refusing to.
    struct MockConnect {
        reply: Vec<u8>,
        refuse: bool,
        hang: bool,
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
        connects: AtomicUsize,
        closed: Arc<AtomicBool>,
    }

    impl MockConnect {
        fn new(reply: Vec<u8>) -> Self {
            Self {
                reply,
                refuse: false,
                hang: false,
                sent: Arc::new(Mutex::new(Vec::new())),
                connects: AtomicUsize::new(0),
                closed: Arc::new(AtomicBool::new(false)),
            }
        }

        fn refusing() -> Self {
            Self {
                refuse: true,
                ..Self::new(Vec::new())
            }
        }

        fn hanging() -> Self {
            Self {
                hang: true,
                ..Self::new(Vec::new())
            }
        }
    }

    impl Connect for &MockConnect {
        type Connection = MockDgram;
        type Fut =
            std::future::Ready<Result<Self::Connection, io::Error>>;

        fn connect(&self, _addr: SocketAddr) -> Self::Fut {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.refuse {
                ready(Err(io::Error::from(io::ErrorKind::AddrNotAvailable)))
            } else {
                ready(Ok(MockDgram {
                    reply: self.reply.clone(),
                    sent: self.sent.clone(),
                    hang: self.hang,
                    closed: self.closed.clone(),
                }))
            }
        }
    }

    fn query() -> Query {
        Query::new("igor.io".parse().unwrap(), Rtype::A, Class::IN, 1)
    }

    fn server() -> SocketAddr {
        "192.0.2.53:53".parse().unwrap()
    }

    fn executor(connect: &MockConnect, id: u16) -> DgramExecutor<&MockConnect> {
        DgramExecutor::with_builder(
            connect,
            RequestBuilder::with_ids(Arc::new(StaticIds(id))),
        )
    }

    /// Builds a reply to the request the executor will send for `id`.
    fn reply(id: u16, tc: bool) -> Vec<u8> {
        let mut msg = RequestBuilder::with_ids(Arc::new(StaticIds(id)))
            .build(&query());
        msg.header_mut().set_qr(true);
        msg.header_mut().set_tc(tc);
        msg.to_bytes().unwrap().to_vec()
    }

    #[test]
    fn plain_response_is_returned() {
        tokio_test::block_on(async {
            let connect = MockConnect::new(reply(99, false));
            let exec = executor(&connect, 99);
            let token = CancellationToken::new();
            let response =
                exec.query(server(), &query(), &token).await.unwrap();
            assert!(response.header().qr());
            assert_eq!(response.header().id(), 99);
            // The request went out exactly once.
            assert_eq!(connect.sent.lock().unwrap().len(), 1);
        });
    }

    #[test]
    fn truncated_response_is_an_error() {
        tokio_test::block_on(async {
            let connect = MockConnect::new(reply(99, true));
            let exec = executor(&connect, 99);
            let token = CancellationToken::new();
            let err =
                exec.query(server(), &query(), &token).await.unwrap_err();
            assert!(matches!(err, Error::TruncatedResponse));
        });
    }

    #[test]
    fn mismatched_id_is_a_bad_server() {
        tokio_test::block_on(async {
            let connect = MockConnect::new(reply(100, false));
            let exec = executor(&connect, 99);
            let token = CancellationToken::new();
            let err =
                exec.query(server(), &query(), &token).await.unwrap_err();
            assert!(matches!(err, Error::BadServer { .. }));
        });
    }

    #[test]
    fn connect_failure_is_transport_unavailable() {
        tokio_test::block_on(async {
            let connect = MockConnect::refusing();
            let exec = executor(&connect, 99);
            let token = CancellationToken::new();
            let err =
                exec.query(server(), &query(), &token).await.unwrap_err();
            assert!(matches!(err, Error::TransportUnavailable(_)));
        });
    }

    #[test]
    fn cancelled_before_start_creates_no_socket() {
        tokio_test::block_on(async {
            let connect = MockConnect::new(reply(99, false));
            let exec = executor(&connect, 99);
            let token = CancellationToken::new();
            token.cancel();
            let err =
                exec.query(server(), &query(), &token).await.unwrap_err();
            match err {
                Error::Cancelled { name } => assert_eq!(name, "igor.io"),
                other => panic!("expected cancellation, got {:?}", other),
            }
            assert_eq!(connect.connects.load(Ordering::SeqCst), 0);
        });
    }

    #[test]
    fn cancellation_mid_flight_closes_the_socket() {
        tokio_test::block_on(async {
            // The receive would hang forever.
            let connect = MockConnect::hanging();
            let exec = executor(&connect, 99);
            let token = CancellationToken::new();
            let q = query();
            let mut task = tokio_test::task::spawn(
                exec.query(server(), &q, &token),
            );
            // Let the executor get as far as the pending receive.
            tokio_test::assert_pending!(task.poll());
            assert!(!connect.closed.load(Ordering::SeqCst));
            token.cancel();
            let err = task.await.unwrap_err();
            match err {
                Error::Cancelled { name } => assert_eq!(name, "igor.io"),
                other => panic!("expected cancellation, got {:?}", other),
            }
            assert_eq!(connect.connects.load(Ordering::SeqCst), 1);
            assert!(connect.closed.load(Ordering::SeqCst));
        });
    }
}
