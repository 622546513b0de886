use nom::bits::{bits, complete::take as take_bits};
use nom::bytes::complete::take;
use nom::combinator::map;
use nom::error::Error;
use nom::number::complete::be_u8;
use nom::sequence::tuple;
use nom::IResult;
use std::{error, fmt};
use super::timestamp::{parse_short, parse_timestamp, Instant, NtpShortTime};
use super::{MAXSTRAT, MODE_CLIENT, MODE_SERVER, PACKET_LENGTH, VERSION};

/// Leap indicator value meaning the server clock is unsynchronized.
const LEAP_ALARM: u8 = 3;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// Returned when fewer than `PACKET_LENGTH` bytes were received.
pub struct MalformedReply {
  pub len: usize,
}

impl fmt::Display for MalformedReply {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "reply is {} bytes long, expected at least {}", self.len, PACKET_LENGTH)
  }
}

impl error::Error for MalformedReply {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// The first two octets of a reply. Decoded for diagnostics only.
pub struct Header {
  /// 2-bit field warning of leap seconds
  pub leap: u8,
  /// 3-bit integer describing the protocol version
  pub version: u8,
  /// 3-bit integer representing the mode
  pub mode: u8,
  /// Server stratum, or 0 for unspecified / kiss-o'-death.
  pub stratum: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// The fields of a server reply this client uses.
pub struct Reply {
  pub header: Header,
  /// Maximum error relative to the primary reference source.
  pub root_dispersion: NtpShortTime,
  /// T2: time the request arrived at the server.
  pub server_receive: Instant,
  /// T3: time the reply departed the server.
  pub server_transmit: Instant,
}

impl Header {
  /// Describes everything unusual about this header, one entry per problem.
  ///
  /// Nothing here causes a reply to be rejected.
  pub fn anomalies(&self) -> Vec<String> {
    let mut found = Vec::new();
    if self.version != VERSION {
      found.push(format!("has version {}, but our version is {}", self.version, VERSION));
    }
    if self.mode != MODE_SERVER {
      found.push(format!("has mode {}, expected {}", self.mode, MODE_SERVER));
    }
    if self.stratum == 0 {
      found.push("has unspecified stratum (kiss-o'-death?)".to_string());
    } else if self.stratum > MAXSTRAT {
      found.push(format!("at stratum {}, which is greater than the maximum stratum of {}", self.stratum, MAXSTRAT));
    }
    if self.leap == LEAP_ALARM {
      found.push("reports an unsynchronized clock".to_string());
    }
    found
  }
}

/// Builds a client request: LI=0, VN=4, Mode=3 and nothing else.
pub fn build_request() -> [u8; PACKET_LENGTH] {
  let mut msg = [0u8; PACKET_LENGTH];
  msg[0] = (VERSION << 3) | MODE_CLIENT;
  msg
}

fn parse_header(input: &[u8]) -> IResult<&[u8], Header> {
  map(
    tuple((
      bits::<_, _, Error<(&[u8], usize)>, _, _>(tuple((
        take_bits::<_, u8, _, _>(2usize), // leap
        take_bits::<_, u8, _, _>(3usize), // version
        take_bits::<_, u8, _, _>(3usize), // mode
      ))),
      be_u8,
    )),
    |((leap, version, mode), stratum)| Header { leap, version, mode, stratum },
  )(input)
}

fn parse_reply(input: &[u8]) -> IResult<&[u8], Reply> {
  map(
    tuple((
      parse_header,
      take(6usize), // poll, precision, root delay
      parse_short,
      take(20usize), // reference id, reference timestamp, origin timestamp
      parse_timestamp,
      parse_timestamp,
    )),
    |(header, _, root_dispersion, _, rec, xmt)| Reply {
      header: header,
      root_dispersion: root_dispersion,
      server_receive: rec.into(),
      server_transmit: xmt.into(),
    },
  )(input)
}

/// Decodes a complete reply datagram.
///
/// Anything past the 48-byte header is ignored; the number of ignored bytes
/// is returned alongside the reply. Buffers shorter than 48 bytes are never
/// looked at.
pub fn decode_reply(buf: &[u8]) -> Result<(Reply, usize), MalformedReply> {
  if buf.len() < PACKET_LENGTH {
    return Err(MalformedReply { len: buf.len() });
  }

  match parse_reply(buf) {
    Ok((ext, reply)) => Ok((reply, ext.len())),
    Err(_) => Err(MalformedReply { len: buf.len() }),
  }
}
