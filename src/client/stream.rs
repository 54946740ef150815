//! The stream transport executor.

#![warn(missing_docs)]

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::base::wire::{ComposeError, FrameDecoder};
use crate::base::Message;
use crate::client::error::Error;
use crate::client::protocol::Connect;
use crate::client::request::{
    is_answer, Query, QueryExecutor, RequestBuilder,
};

//------------ StreamExecutor ------------------------------------------------

/// A query executor performing one TCP round trip.
///
/// The wire request is sent behind a two octet big-endian length prefix
/// and the response is reassembled from however many partial deliveries
/// the connection produces before a parse is attempted. A response with
/// the truncated flag set is a protocol violation over a stream
/// transport and fails as a bad server rather than triggering another
/// fallback.
#[derive(Clone, Debug)]
pub struct StreamExecutor<C> {
    /// Creates the connection for each attempt.
    connect: C,

    /// Builds the wire request, one fresh message per attempt.
    builder: RequestBuilder,
}

impl<C> StreamExecutor<C> {
    /// Creates a new executor using `connect` for its connections.
    pub fn new(connect: C) -> Self {
        Self::with_builder(connect, RequestBuilder::new())
    }

    /// Creates a new executor with an explicit request builder.
    pub fn with_builder(connect: C, builder: RequestBuilder) -> Self {
        Self { connect, builder }
    }
}

impl<C> StreamExecutor<C>
where
    C: Connect,
    C::Connection: AsyncRead + AsyncWrite + Send + Unpin,
{
    /// Performs the round trip.
    ///
    /// The connection lives entirely within this function and is closed
    /// by dropping it: before the response is parsed on the success
    /// path, so that no late connection event can interfere with an
    /// outcome that is already decided, and on every error and
    /// cancellation path alike.
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
        let payload = request.to_bytes().map_err(Error::Compose)?;
        let len = u16::try_from(payload.len())
            .map_err(|_| Error::Compose(ComposeError::LongMessage))?;
        let mut frame = Vec::with_capacity(payload.len() + 2);
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(&payload);

        let mut conn = tokio::select! {
            _ = token.cancelled() => return Err(query.cancelled()),
            res = self.connect.connect(server) => {
                res.map_err(|err| {
                    Error::TransportUnavailable(Arc::new(err))
                })?
            }
        };

        tokio::select! {
            _ = token.cancelled() => return Err(query.cancelled()),
            res = conn.write_all(&frame) => {
                res.map_err(|err| Error::StreamWrite(Arc::new(err)))?
            }
        };

        let mut decoder = FrameDecoder::new();
        let payload = loop {
            if let Some(payload) = decoder.complete_frame() {
                break payload;
            }
            let read = tokio::select! {
                _ = token.cancelled() => return Err(query.cancelled()),
                res = conn.read_buf(decoder.buf_mut()) => {
                    res.map_err(|err| Error::StreamRead(Arc::new(err)))?
                }
            };
            if read == 0 {
                return Err(Error::ConnectionDropped);
            }
        };
        drop(conn);

        let response =
            Message::from_bytes(&payload).map_err(Error::Parse)?;
        if !is_answer(&response, &request) {
            return Err(Error::BadServer {
                server,
                cause: None,
            });
        }
        if response.header().tc() {
            trace!(name = %query.name(), %server,
                "server truncated a stream response");
            return Err(Error::BadServer {
                server,
                cause: Some(Box::new(Error::TruncatedResponse)),
            });
        }
        Ok(response)
    }
}

impl<C> QueryExecutor for StreamExecutor<C>
where
    C: Connect,
    C::Connection: AsyncRead + AsyncWrite + Send + Unpin,
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
