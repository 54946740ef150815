//! An asynchronous DNS stub resolver transport pipeline.
//!
//! This crate turns a DNS [`Query`][client::request::Query] into a
//! wire-format request, transmits it to a single nameserver over UDP or
//! TCP, and returns the parsed response [`Message`][base::Message]. The
//! interesting part is not the wire format but the query execution
//! pipeline: a chain of small executors that each add one resilience
//! concern and compose by plain wrapping.
//!
//! * [`client::dgram`] sends one datagram and awaits one reply.
//! * [`client::stream`] performs a length-prefixed TCP round trip,
//!   buffering partial reads until a full message is available.
//! * [`client::selective`] picks a transport by estimated request size
//!   and falls back from UDP to TCP when the server truncates.
//! * [`client::timeout`] bounds the latency of whatever it wraps.
//! * [`client::retry`] re-issues failed queries a bounded number of
//!   times.
//! * [`client::rejecting`] fails immediately without performing I/O.
//!
//! The conventional composition, built by [`client::pipeline`], is
//! retry wrapping timeout wrapping the selective transport:
//!
//! ```no_run
//! use stubres::base::iana::{Class, Rtype};
//! use stubres::base::name::Name;
//! use stubres::client::{pipeline, PipelineConfig};
//! use stubres::client::protocol::parse_nameserver;
//! use stubres::client::request::{Query, QueryExecutor};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn _demo() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = pipeline(PipelineConfig::default());
//! let server = parse_nameserver("192.0.2.53")?;
//! let query = Query::new("example.com".parse::<Name>()?, Rtype::A, Class::IN, 1);
//! let token = CancellationToken::new();
//! let response = executor.query(server, &query, &token).await?;
//! # Ok(())
//! # }
//! ```
//!
//! Every operation is asynchronous and observes a
//! [`CancellationToken`][tokio_util::sync::CancellationToken]:
//! cancellation propagates through every wrapping layer to the innermost
//! socket, connection, or timer, which is released exactly once, and the
//! operation terminates with a distinguishable
//! [`Error::Cancelled`][client::error::Error] rather than hanging.

#![warn(missing_docs)]

pub mod base;
pub mod client;
