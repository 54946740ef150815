//! The timeout executor.

#![warn(missing_docs)]

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

use tokio::time::{timeout, Duration};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::base::Message;
use crate::client::error::Error;
use crate::client::request::{Query, QueryExecutor};

/// The default deadline for a single attempt.
pub const DEF_TIMEOUT: Duration = Duration::from_secs(5);

//------------ TimeoutExecutor -----------------------------------------------

/// A query executor bounding the latency of the executor it wraps.
///
/// The deadline races the inner operation; whichever loses is
/// cancelled, so exactly one of the two produces the outcome. Wrapped
/// inside a retry executor this gives every attempt its own full
/// timeout window.
#[derive(Clone, Debug)]
pub struct TimeoutExecutor<E> {
    /// The executor being bounded.
    inner: E,

    /// The deadline for a single attempt.
    timeout: Duration,
}

impl<E> TimeoutExecutor<E> {
    /// Creates a new executor with the default deadline.
    pub fn new(inner: E) -> Self {
        Self::with_timeout(inner, DEF_TIMEOUT)
    }

    /// Creates a new executor with an explicit deadline.
    pub fn with_timeout(inner: E, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Returns the deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<E: QueryExecutor> TimeoutExecutor<E> {
    /// Delegates to the inner executor under a deadline.
    async fn query_impl(
        &self,
        server: SocketAddr,
        query: &Query,
        token: &CancellationToken,
    ) -> Result<Message, Error> {
        // The inner attempt gets a child token so that the deadline can
        // cancel it without touching the caller's token.
        let attempt = token.child_token();
        match timeout(
            self.timeout,
            self.inner.query(server, query, &attempt),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                attempt.cancel();
                trace!(name = %query.name(), timeout = ?self.timeout,
                    "query attempt timed out");
                Err(Error::Timeout {
                    name: query.name().to_string(),
                })
            }
        }
    }
}

impl<E: QueryExecutor> QueryExecutor for TimeoutExecutor<E> {
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
