//! The retry executor.

#![warn(missing_docs)]

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::base::Message;
use crate::client::error::Error;
use crate::client::request::{Query, QueryExecutor};

/// The default number of retries after the first attempt.
pub const DEF_RETRIES: usize = 2;

//------------ RetryExecutor -------------------------------------------------

/// A query executor re-issuing failed queries a bounded number of times.
///
/// Attempts are strictly sequential; a new one starts only after the
/// previous one has fully terminated. Each attempt re-enters the whole
/// inner pipeline, so it gets its own timeout window, transaction ID
/// and transport choice. Cancellation and server protocol violations
/// are terminal; transient failures are retried, and after the
/// attempts are exhausted the last error is surfaced.
#[derive(Clone, Debug)]
pub struct RetryExecutor<E> {
    /// The executor whose queries are retried.
    inner: E,

    /// How many times a failed query is re-issued.
    retries: usize,
}

impl<E> RetryExecutor<E> {
    /// Creates a new executor with the default retry count.
    pub fn new(inner: E) -> Self {
        Self::with_retries(inner, DEF_RETRIES)
    }

    /// Creates a new executor with an explicit retry count.
    ///
    /// `retries` counts the re-issues, so a query is attempted at most
    /// `retries + 1` times.
    pub fn with_retries(inner: E, retries: usize) -> Self {
        Self { inner, retries }
    }

    /// Returns the retry count.
    pub fn retries(&self) -> usize {
        self.retries
    }
}

impl<E: QueryExecutor> RetryExecutor<E> {
    /// Runs the attempt loop.
    async fn query_impl(
        &self,
        server: SocketAddr,
        query: &Query,
        token: &CancellationToken,
    ) -> Result<Message, Error> {
        let mut attempt = 0;
        loop {
            if token.is_cancelled() {
                return Err(query.cancelled());
            }
            match self.inner.query(server, query, token).await {
                Ok(response) => return Ok(response),
                // A cancelled query must not be re-issued, and a server
                // that violates the protocol will not stop doing so for
                // being asked again.
                Err(err @ Error::Cancelled { .. })
                | Err(err @ Error::BadServer { .. }) => return Err(err),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    attempt += 1;
                    debug!(name = %query.name(), %server, attempt,
                        error = %err, "query attempt failed, retrying");
                }
            }
        }
    }
}

impl<E: QueryExecutor> QueryExecutor for RetryExecutor<E> {
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
    use std::future::ready;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// An executor replaying a scripted sequence of outcomes.
    struct SequenceExecutor {
        /// Errors to fail with, in order; success once they run out.
        script: Mutex<Vec<Error>>,

        /// Number of times `query` was called.
        calls: AtomicUsize,
    }

    impl SequenceExecutor {
        fn new(script: Vec<Error>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl QueryExecutor for SequenceExecutor {
        fn query<'a>(
            &'a self,
            _server: SocketAddr,
            _query: &'a Query,
            _token: &'a CancellationToken,
        ) -> Pin<
            Box<
                dyn Future<Output = Result<Message, Error>> + Send + 'a,
            >,
        > {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            Box::pin(ready(if script.is_empty() {
                Ok(Message::new())
            } else {
                Err(script.remove(0))
            }))
        }
    }

    fn query() -> Query {
        Query::new("igor.io".parse().unwrap(), Rtype::A, Class::IN, 1)
    }

    fn server() -> SocketAddr {
        "192.0.2.53:53".parse().unwrap()
    }

    #[test]
    fn success_on_first_attempt_is_not_retried() {
        tokio_test::block_on(async {
            let inner = SequenceExecutor::new(Vec::new());
            let exec = RetryExecutor::with_retries(&inner, 2);
            let token = CancellationToken::new();
            exec.query(server(), &query(), &token).await.unwrap();
            assert_eq!(inner.calls(), 1);
        });
    }

    #[test]
    fn failure_is_retried_until_success() {
        tokio_test::block_on(async {
            let inner = SequenceExecutor::new(vec![
                Error::Timeout {
                    name: "igor.io".into(),
                },
                Error::ConnectionDropped,
            ]);
            let exec = RetryExecutor::with_retries(&inner, 2);
            let token = CancellationToken::new();
            exec.query(server(), &query(), &token).await.unwrap();
            assert_eq!(inner.calls(), 3);
        });
    }

    #[test]
    fn exhausted_retries_surface_the_last_error() {
        tokio_test::block_on(async {
            let inner = SequenceExecutor::new(vec![
                Error::ConnectionDropped,
                Error::ConnectionDropped,
                Error::Timeout {
                    name: "igor.io".into(),
                },
            ]);
            let exec = RetryExecutor::with_retries(&inner, 2);
            let token = CancellationToken::new();
            let err =
                exec.query(server(), &query(), &token).await.unwrap_err();
            assert!(matches!(err, Error::Timeout { .. }));
            assert_eq!(inner.calls(), 3);
        });
    }

    #[test]
    fn cancellation_is_not_retried() {
        tokio_test::block_on(async {
            let inner = SequenceExecutor::new(vec![
                Error::Cancelled {
                    name: "igor.io".into(),
                },
                Error::ConnectionDropped,
            ]);
            let exec = RetryExecutor::with_retries(&inner, 2);
            let token = CancellationToken::new();
            let err =
                exec.query(server(), &query(), &token).await.unwrap_err();
            assert!(matches!(err, Error::Cancelled { .. }));
            assert_eq!(inner.calls(), 1);
        });
    }

    #[test]
    fn bad_server_response_is_not_retried() {
        tokio_test::block_on(async {
            let inner = SequenceExecutor::new(vec![
                Error::BadServer {
                    server: server(),
                    cause: None,
                },
                Error::ConnectionDropped,
            ]);
            let exec = RetryExecutor::with_retries(&inner, 2);
            let token = CancellationToken::new();
            let err =
                exec.query(server(), &query(), &token).await.unwrap_err();
            assert!(matches!(err, Error::BadServer { .. }));
            assert_eq!(inner.calls(), 1);
        });
    }

    #[test]
    fn cancelled_token_prevents_further_attempts() {
        tokio_test::block_on(async {
            let inner = SequenceExecutor::new(vec![]);
            let exec = RetryExecutor::with_retries(&inner, 2);
            let token = CancellationToken::new();
            token.cancel();
            let err =
                exec.query(server(), &query(), &token).await.unwrap_err();
            assert!(matches!(err, Error::Cancelled { .. }));
            assert_eq!(inner.calls(), 0);
        });
    }
}
