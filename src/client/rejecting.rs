//! The rejecting executor.

#![warn(missing_docs)]

use std::future::{ready, Future};
use std::net::SocketAddr;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::base::Message;
use crate::client::error::Error;
use crate::client::request::{Query, QueryExecutor};

//------------ RejectingExecutor ---------------------------------------------

/// A query executor that always fails immediately.
///
/// No I/O, no state. This terminates configurations that must never
/// perform a live lookup, for instance a resolver wired into a
/// connector that only ever deals in literal addresses.
#[derive(Clone, Debug, Default)]
pub struct RejectingExecutor {
    /// The reason queries are rejected with, if one was supplied.
    reason: Option<Error>,
}

impl RejectingExecutor {
    /// Creates an executor rejecting without a specific reason.
    ///
    /// Queries fail with [`Error::NoTransportAvailable`], which carries
    /// no underlying cause.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates an executor rejecting with the given reason.
    pub fn with_reason(reason: Error) -> Self {
        Self {
            reason: Some(reason),
        }
    }
}

impl QueryExecutor for RejectingExecutor {
    fn query<'a>(
        &'a self,
        _server: SocketAddr,
        _query: &'a Query,
        _token: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<Message, Error>> + Send + 'a>>
    {
        Box::pin(ready(Err(match &self.reason {
            Some(reason) => reason.clone(),
            None => Error::NoTransportAvailable,
        })))
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::iana::{Class, Rtype};
    use std::error::Error as _;

    fn query() -> Query {
        Query::new("igor.io".parse().unwrap(), Rtype::A, Class::IN, 1)
    }

    fn server() -> SocketAddr {
        "192.0.2.53:53".parse().unwrap()
    }

    #[test]
    fn rejects_without_a_cause_by_default() {
        tokio_test::block_on(async {
            let exec = RejectingExecutor::new();
            let token = CancellationToken::new();
            let err =
                exec.query(server(), &query(), &token).await.unwrap_err();
            assert!(matches!(err, Error::NoTransportAvailable));
            assert!(err.source().is_none());
        });
    }

    #[test]
    fn rejects_with_exactly_the_given_reason() {
        tokio_test::block_on(async {
            let exec = RejectingExecutor::with_reason(
                Error::ConnectionDropped,
            );
            let token = CancellationToken::new();
            let err =
                exec.query(server(), &query(), &token).await.unwrap_err();
            assert!(matches!(err, Error::ConnectionDropped));
        });
    }
}
