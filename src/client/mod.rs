//! Sending queries and receiving responses.
//!
//! This module provides the query execution pipeline: a chain of
//! composable executors, each adding one resilience concern,
//! terminating in a datagram and a stream transport.
//!
//! Executing a query consists of three steps:
//! 1) Creating a [`Query`][request::Query],
//! 2) Creating an executor, and
//! 3) Calling [`query`][request::QueryExecutor::query] with the
//!    nameserver address and a cancellation token.
//!
//! # Creating an executor
//!
//! The transports at the bottom of the chain are
//! [`DgramExecutor`][dgram::DgramExecutor] for UDP and
//! [`StreamExecutor`][stream::StreamExecutor] for TCP. On top of those,
//! [`SelectiveExecutor`][selective::SelectiveExecutor] chooses a
//! transport by estimated request size and falls back from UDP to TCP
//! on truncation, [`TimeoutExecutor`][timeout::TimeoutExecutor] bounds
//! the latency of each attempt, and
//! [`RetryExecutor`][retry::RetryExecutor] re-issues failed queries.
//! Composition is ordinary wrapping, so the order encodes policy:
//! timeouts apply per attempt when retry wraps timeout, and the
//! transport choice is made anew on every attempt when it sits inside.
//!
//! [`pipeline`] builds the conventional arrangement:
//!
//! ```text
//! RetryExecutor -> TimeoutExecutor -> SelectiveExecutor -> UDP | TCP
//! ```
//!
//! # Cancellation
//!
//! Every executor observes the
//! [`CancellationToken`][tokio_util::sync::CancellationToken] handed to
//! [`query`][request::QueryExecutor::query] at each of its suspension
//! points. Cancelling it fails the operation with
//! [`Error::Cancelled`][error::Error::Cancelled] and releases whatever
//! socket, connection, or timer the innermost active executor holds.

#![warn(missing_docs)]

pub mod dgram;
pub mod error;
pub mod protocol;
pub mod rejecting;
pub mod request;
pub mod retry;
pub mod selective;
pub mod stream;
pub mod timeout;

use tokio::time::Duration;

use self::dgram::DgramExecutor;
use self::protocol::{TcpConnect, UdpConnect};
use self::retry::RetryExecutor;
use self::selective::SelectiveExecutor;
use self::stream::StreamExecutor;
use self::timeout::TimeoutExecutor;

//------------ PipelineConfig ------------------------------------------------

/// Configuration for the conventional executor pipeline.
#[derive(Clone, Copy, Debug)]
pub struct PipelineConfig {
    /// Request sizes above this go straight to the stream transport.
    pub threshold: usize,

    /// The deadline for a single attempt.
    pub timeout: Duration,

    /// How many times a failed query is re-issued.
    pub retries: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: selective::DEF_SIZE_THRESHOLD,
            timeout: timeout::DEF_TIMEOUT,
            retries: retry::DEF_RETRIES,
        }
    }
}

/// The type of the conventional executor pipeline.
pub type Pipeline = RetryExecutor<
    TimeoutExecutor<
        SelectiveExecutor<
            DgramExecutor<UdpConnect>,
            StreamExecutor<TcpConnect>,
        >,
    >,
>;

/// Builds the conventional executor pipeline over real sockets.
pub fn pipeline(config: PipelineConfig) -> Pipeline {
    RetryExecutor::with_retries(
        TimeoutExecutor::with_timeout(
            SelectiveExecutor::with_threshold(
                DgramExecutor::new(UdpConnect::new()),
                StreamExecutor::new(TcpConnect::new()),
                config.threshold,
            ),
            config.timeout,
        ),
        config.retries,
    )
}
