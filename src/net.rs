use std::{error, fmt, io};
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

#[derive(Debug)]
/// Combined error type for resolution and socket errors
pub enum NetError {
  Resolve(String, io::Error),
  Socket(io::Error),
}

impl fmt::Display for NetError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      NetError::Resolve(ref host, ref err) => write!(f, "Couldn't resolve {}: {}", host, err),
      NetError::Socket(ref err) => write!(f, "Couldn't create socket: {}", err),
    }
  }
}

impl error::Error for NetError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match *self {
      NetError::Resolve(_, ref err) => Some(err),
      NetError::Socket(ref err) => Some(err),
    }
  }
}

/// A datagram path to one server.
pub trait Channel {
  /// Sends one datagram to the server.
  fn send(&self, buf: &[u8]) -> io::Result<usize>;

  /// Blocks until one whole datagram arrives, returning its length and source.
  fn recv(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;

  /// Where requests go.
  fn peer(&self) -> SocketAddr;
}

#[derive(Debug)]
/// A UDP socket bound for talking to a single resolved server address.
pub struct UdpChannel {
  socket: UdpSocket,
  peer: SocketAddr,
}

impl UdpChannel {
  /// Wraps an already-bound socket.
  pub fn new(socket: UdpSocket, peer: SocketAddr) -> UdpChannel {
    UdpChannel { socket: socket, peer: peer }
  }
}

impl Channel for UdpChannel {
  fn send(&self, buf: &[u8]) -> io::Result<usize> {
    self.socket.send_to(buf, self.peer)
  }

  fn recv(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
    self.socket.recv_from(buf)
  }

  fn peer(&self) -> SocketAddr {
    self.peer
  }
}

fn bind_addr_for(target: &SocketAddr) -> SocketAddr {
  match *target {
    SocketAddr::V4(_) => SocketAddr::from(([0, 0, 0, 0], 0)),
    SocketAddr::V6(_) => SocketAddr::from(([0u16; 8], 0)),
  }
}

/// Resolves `host` and opens a socket for the first address that takes one.
///
/// A `timeout` bounds every later receive; without one, receives block
/// until a reply arrives.
pub fn open(host: &str, port: u16, timeout: Option<Duration>) -> Result<UdpChannel, NetError> {
  let addrs: Vec<SocketAddr> = (host, port)
    .to_socket_addrs()
    .map_err(|err| NetError::Resolve(host.to_string(), err))?
    .collect();
  if addrs.is_empty() {
    let err = io::Error::new(io::ErrorKind::NotFound, "no addresses found");
    return Err(NetError::Resolve(host.to_string(), err));
  }

  let mut last_err = None;
  for addr in addrs {
    trace!("Trying {} for {}", addr, host);
    match UdpSocket::bind(bind_addr_for(&addr)) {
      Ok(socket) => {
        socket.set_read_timeout(timeout).map_err(NetError::Socket)?;
        debug!("Using {} for {}", addr, host);
        return Ok(UdpChannel::new(socket, addr));
      }
      Err(err) => {
        warn!("Couldn't open socket for {}: {}", addr, err);
        last_err = Some(err);
      }
    }
  }

  Err(NetError::Socket(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "no usable address"))))
}
