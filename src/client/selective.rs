//! The selective transport executor.

#![warn(missing_docs)]

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::base::Message;
use crate::client::error::Error;
use crate::client::request::{Query, QueryExecutor, RequestBuilder};

/// The default request size above which the stream transport is used.
///
/// This is the classic DNS over UDP payload ceiling.
pub const DEF_SIZE_THRESHOLD: usize = 512;

//------------ SelectiveExecutor ---------------------------------------------

/// A query executor choosing between a datagram and a stream transport.
///
/// Requests whose serialized size exceeds the threshold go straight to
/// the stream executor. Everything else is tried over the datagram
/// executor first; a truncated datagram response is the one failure
/// that is recoverable by substitution, by re-issuing the same query
/// over the stream executor and adopting its outcome. Any other failure
/// propagates unchanged.
#[derive(Clone, Debug)]
pub struct SelectiveExecutor<D, S> {
    /// The datagram-capable executor.
    dgram: D,

    /// The stream-capable executor.
    stream: S,

    /// Request sizes above this go straight to the stream executor.
    threshold: usize,

    /// Builds the request used for size estimation.
    ///
    /// The transports build their own requests; the message built here
    /// is never transmitted.
    builder: RequestBuilder,
}

impl<D, S> SelectiveExecutor<D, S> {
    /// Creates a new executor with the default size threshold.
    pub fn new(dgram: D, stream: S) -> Self {
        Self::with_threshold(dgram, stream, DEF_SIZE_THRESHOLD)
    }

    /// Creates a new executor with an explicit size threshold.
    pub fn with_threshold(dgram: D, stream: S, threshold: usize) -> Self {
        Self {
            dgram,
            stream,
            threshold,
            builder: RequestBuilder::new(),
        }
    }

    /// Returns the size threshold.
    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

impl<D, S> SelectiveExecutor<D, S>
where
    D: QueryExecutor,
    S: QueryExecutor,
{
    /// Dispatches the query to the appropriate transport.
    async fn query_impl(
        &self,
        server: SocketAddr,
        query: &Query,
        token: &CancellationToken,
    ) -> Result<Message, Error> {
        let estimate = self.builder.build(query);
        let size = estimate.to_bytes().map_err(Error::Compose)?.len();
        if size > self.threshold {
            trace!(name = %query.name(), size,
                "request exceeds datagram threshold, using stream");
            return self.stream.query(server, query, token).await;
        }
        match self.dgram.query(server, query, token).await {
            Err(Error::TruncatedResponse) => {
                trace!(name = %query.name(), %server,
                    "truncated datagram response, retrying over stream");
                self.stream.query(server, query, token).await
            }
            other => other,
        }
    }
}

impl<D, S> QueryExecutor for SelectiveExecutor<D, S>
where
    D: QueryExecutor,
    S: QueryExecutor,
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
