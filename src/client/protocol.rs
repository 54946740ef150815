//! Underlying transport protocols.
//!
//! The transport executors do not talk to sockets directly; they go
//! through the small traits in this module so that tests can substitute
//! scripted connections. [`UdpConnect`] and [`TcpConnect`] are the real
//! implementations.

use core::future::Future;
use core::pin::Pin;
use std::boxed::Box;
use std::error;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::vec::Vec;

use tokio::net::{TcpStream, UdpSocket};

/// How many times do we try a new random port if we get 'address in use.'
const RETRY_RANDOM_PORT: usize = 10;

/// The port assumed when a nameserver string does not name one.
const DEFAULT_PORT: u16 = 53;

//------------ Connect -------------------------------------------------------

/// Establish a connection to a nameserver asynchronously.
///
/// The address is taken per call; the pipeline receives the nameserver
/// with every query rather than binding one per transport.
pub trait Connect: Send + Sync {
    /// The type of an established connection.
    type Connection;

    /// The future establishing the connection.
    type Fut: Future<Output = Result<Self::Connection, io::Error>> + Send;

    /// Returns a future establishing a connection to `addr`.
    fn connect(&self, addr: SocketAddr) -> Self::Fut;
}

//------------ DgramRecv -----------------------------------------------------

/// Receive a datagram packet asynchronously.
pub trait DgramRecv {
    /// The future performing the receive operation.
    type Fut: Future<Output = Result<Vec<u8>, io::Error>> + Send;

    /// Returns a future that receives one packet into `buf`.
    ///
    /// The returned vector is `buf` truncated to the packet length.
    fn recv(&self, buf: Vec<u8>) -> Self::Fut;
}

//------------ DgramSend -----------------------------------------------------

/// Send a datagram packet asynchronously.
pub trait DgramSend {
    /// The future performing the send operation.
    type Fut: Future<Output = Result<usize, io::Error>> + Send;

    /// Returns a future that sends one packet.
    fn send(&self, buf: &[u8]) -> Self::Fut;
}

//------------ UdpConnect ----------------------------------------------------

/// Create new UDP "connections".
#[derive(Clone, Copy, Debug, Default)]
pub struct UdpConnect;

impl UdpConnect {
    /// Creates a new UDP connection factory.
    pub fn new() -> Self {
        Default::default()
    }
}

impl Connect for UdpConnect {
    type Connection = UdpDgram;
    type Fut = Pin<
        Box<
            dyn Future<Output = Result<Self::Connection, std::io::Error>>
                + Send,
        >,
    >;

    fn connect(&self, addr: SocketAddr) -> Self::Fut {
        Box::pin(UdpDgram::new(addr))
    }
}

/// A single UDP 'connection'.
#[derive(Debug)]
pub struct UdpDgram {
    /// Underlying UDP socket.
    sock: Arc<UdpSocket>,
}

impl UdpDgram {
    /// Creates a new socket connected to `addr`.
    async fn new(addr: SocketAddr) -> Result<Self, io::Error> {
        let sock = Self::udp_bind(addr.is_ipv4()).await?;
        sock.connect(addr).await?;
        Ok(Self {
            sock: Arc::new(sock),
        })
    }

    /// Binds to a local UDP port chosen by the system.
    async fn udp_bind(v4: bool) -> Result<UdpSocket, io::Error> {
        let mut i = 0;
        loop {
            let local: SocketAddr = if v4 {
                ([0u8; 4], 0).into()
            } else {
                ([0u16; 8], 0).into()
            };
            match UdpSocket::bind(&local).await {
                Ok(sock) => return Ok(sock),
                Err(err) => {
                    if i == RETRY_RANDOM_PORT {
                        return Err(err);
                    } else {
                        i += 1
                    }
                }
            }
        }
    }
}

impl DgramRecv for UdpDgram {
    type Fut =
        Pin<Box<dyn Future<Output = Result<Vec<u8>, io::Error>> + Send>>;

    fn recv(&self, mut buf: Vec<u8>) -> Self::Fut {
        let sock = self.sock.clone();
        Box::pin(async move {
            let len = sock.recv(&mut buf).await?;
            buf.truncate(len);
            Ok(buf)
        })
    }
}

impl DgramSend for UdpDgram {
    type Fut = Pin<Box<dyn Future<Output = Result<usize, io::Error>> + Send>>;

    fn send(&self, buf: &[u8]) -> Self::Fut {
        let sock = self.sock.clone();
        let buf = buf.to_vec();
        Box::pin(async move { sock.send(&buf).await })
    }
}

//------------ TcpConnect ----------------------------------------------------

/// Create new TCP connections.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpConnect;

impl TcpConnect {
    /// Creates a new TCP connection factory.
    pub fn new() -> Self {
        Default::default()
    }
}

impl Connect for TcpConnect {
    type Connection = TcpStream;
    type Fut = Pin<
        Box<
            dyn Future<Output = Result<Self::Connection, std::io::Error>>
                + Send,
        >,
    >;

    fn connect(&self, addr: SocketAddr) -> Self::Fut {
        Box::pin(TcpStream::connect(addr))
    }
}

//------------ Nameserver addresses ------------------------------------------

/// Parses a nameserver address string.
///
/// Accepts `host`, `host:port`, bare IPv6 literals, and bracketed IPv6
/// literals with or without a port. Port 53 is assumed when none is
/// given.
pub fn parse_nameserver(s: &str) -> Result<SocketAddr, AddrError> {
    let mut addr = s.to_string();
    // A bare IPv6 literal has several colons; bracket it before looking
    // for a port.
    if !addr.starts_with('[') && addr.matches(':').count() >= 2 {
        addr = format!("[{}]", addr);
    }
    let has_port = if addr.starts_with('[') {
        addr.contains("]:")
    } else {
        addr.contains(':')
    };
    if !has_port {
        addr = format!("{}:{}", addr, DEFAULT_PORT);
    }
    addr.parse()
        .map_err(|_| AddrError(s.to_string()))
}

/// A nameserver address string could not be understood.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddrError(String);

impl fmt::Display for AddrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid nameserver address '{}'", self.0)
    }
}

impl error::Error for AddrError {}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn ipv4_with_and_without_port() {
        assert_eq!(
            parse_nameserver("8.8.8.8").unwrap(),
            SocketAddr::from((Ipv4Addr::new(8, 8, 8, 8), 53))
        );
        assert_eq!(
            parse_nameserver("8.8.8.8:5353").unwrap(),
            SocketAddr::from((Ipv4Addr::new(8, 8, 8, 8), 5353))
        );
    }

    #[test]
    fn ipv6_literals() {
        let localhost = Ipv6Addr::LOCALHOST;
        assert_eq!(
            parse_nameserver("::1").unwrap(),
            SocketAddr::from((localhost, 53))
        );
        assert_eq!(
            parse_nameserver("[::1]").unwrap(),
            SocketAddr::from((localhost, 53))
        );
        assert_eq!(
            parse_nameserver("[::1]:5353").unwrap(),
            SocketAddr::from((localhost, 5353))
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_nameserver("not an address").is_err());
        assert!(parse_nameserver("").is_err());
    }
}
