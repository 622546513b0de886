use nom::combinator::map;
use nom::number::complete::{be_u16, be_u32};
use nom::sequence::tuple;
use nom::IResult;
use std::{fmt, io, ops};
use super::EPOCH_DELTA;

const NANOS_PER_SEC: u32 = 1_000_000_000;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
/// NTP short format: unsigned 16.16 fixed-point seconds.
///
/// Only used for root delay and root dispersion, so no epoch applies.
pub struct NtpShortTime {
  pub seconds: u16,
  pub fraction: u16,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
/// NTP timestamp format: unsigned 32.32 fixed-point seconds since 1900.
pub struct NtpTimestamp {
  pub seconds: u32,
  pub fraction: u32,
}

pub fn parse_short(input: &[u8]) -> IResult<&[u8], NtpShortTime> {
  map(tuple((be_u16, be_u16)), |(seconds, fraction)| NtpShortTime { seconds, fraction })(input)
}

pub fn parse_timestamp(input: &[u8]) -> IResult<&[u8], NtpTimestamp> {
  map(tuple((be_u32, be_u32)), |(seconds, fraction)| NtpTimestamp { seconds, fraction })(input)
}

impl NtpShortTime {
  /// The fractional part in nanoseconds, truncated.
  pub fn subsec_nanos(&self) -> u32 {
    ((u64::from(self.fraction) * u64::from(NANOS_PER_SEC)) >> 16) as u32
  }

  pub fn as_secs_f64(&self) -> f64 {
    f64::from(self.seconds) + f64::from(self.fraction) / 65_536.0
  }
}

impl From<[u8; 4]> for NtpShortTime {
  fn from(bytes: [u8; 4]) -> NtpShortTime {
    NtpShortTime {
      seconds: u16::from_be_bytes([bytes[0], bytes[1]]),
      fraction: u16::from_be_bytes([bytes[2], bytes[3]]),
    }
  }
}

impl fmt::Display for NtpShortTime {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}.{:09}", self.seconds, self.subsec_nanos())
  }
}

impl From<[u8; 8]> for NtpTimestamp {
  fn from(bytes: [u8; 8]) -> NtpTimestamp {
    NtpTimestamp {
      seconds: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
      fraction: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
    }
  }
}

/// Decodes a 16.16 short-format value into seconds.
pub fn decode_short(bytes: [u8; 4]) -> f64 {
  NtpShortTime::from(bytes).as_secs_f64()
}

/// Decodes a 32.32 timestamp into a Unix-epoch `Instant`.
pub fn decode_timestamp(bytes: [u8; 8]) -> Instant {
  Instant::from(NtpTimestamp::from(bytes))
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
/// A point in time relative to the Unix epoch.
///
/// `subsec_nanos` is always in `0..1_000_000_000` and counts forward from
/// `secs`, so instants before 1970 have negative `secs` and positive nanos.
pub struct Instant {
  secs: i64,
  subsec_nanos: u32,
}

impl Instant {
  pub fn new(secs: i64, subsec_nanos: u32) -> Instant {
    Instant {
      secs: secs + i64::from(subsec_nanos / NANOS_PER_SEC),
      subsec_nanos: subsec_nanos % NANOS_PER_SEC,
    }
  }

  pub fn secs(&self) -> i64 {
    self.secs
  }

  pub fn subsec_nanos(&self) -> u32 {
    self.subsec_nanos
  }

  pub fn as_secs_f64(&self) -> f64 {
    self.secs as f64 + f64::from(self.subsec_nanos) / f64::from(NANOS_PER_SEC)
  }
}

impl From<NtpTimestamp> for Instant {
  fn from(ts: NtpTimestamp) -> Instant {
    let nanos = (u64::from(ts.fraction) * u64::from(NANOS_PER_SEC)) >> 32;
    Instant::new(i64::from(ts.seconds) - EPOCH_DELTA, nanos as u32)
  }
}

impl fmt::Display for Instant {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}.{:09}", self.secs, self.subsec_nanos)
  }
}

impl ops::Sub for Instant {
  type Output = Span;

  fn sub(self, rhs: Instant) -> Span {
    let secs = i128::from(self.secs) - i128::from(rhs.secs);
    let nanos = i128::from(self.subsec_nanos) - i128::from(rhs.subsec_nanos);
    Span(secs * i128::from(NANOS_PER_SEC) + nanos)
  }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
/// A signed, exact difference between two instants, in nanoseconds.
pub struct Span(i128);

impl Span {
  pub const ZERO: Span = Span(0);

  pub fn from_nanos(nanos: i128) -> Span {
    Span(nanos)
  }

  pub fn from_millis(millis: i64) -> Span {
    Span(i128::from(millis) * 1_000_000)
  }

  pub fn from_secs(secs: i64) -> Span {
    Span(i128::from(secs) * i128::from(NANOS_PER_SEC))
  }

  pub fn as_nanos(&self) -> i128 {
    self.0
  }

  /// Rounds toward zero.
  pub fn half(&self) -> Span {
    Span(self.0 / 2)
  }

  pub fn as_secs_f64(&self) -> f64 {
    self.0 as f64 / f64::from(NANOS_PER_SEC)
  }
}

impl ops::Add for Span {
  type Output = Span;

  fn add(self, rhs: Span) -> Span {
    Span(self.0 + rhs.0)
  }
}

impl ops::Sub for Span {
  type Output = Span;

  fn sub(self, rhs: Span) -> Span {
    Span(self.0 - rhs.0)
  }
}

impl fmt::Display for Span {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{:.6}", self.as_secs_f64())
  }
}

/// Source of local wall-clock time for T1 and T4.
pub trait Clock {
  fn now(&self) -> io::Result<Instant>;
}

#[derive(Clone, Copy, Debug, Default)]
/// The realtime system clock.
pub struct SystemClock;

#[cfg(unix)]
impl Clock for SystemClock {
  fn now(&self) -> io::Result<Instant> {
    let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
    if unsafe { libc::clock_gettime(libc::CLOCK_REALTIME, &mut ts) } == -1 {
      return Err(io::Error::last_os_error());
    }
    Ok(Instant::new(ts.tv_sec as i64, ts.tv_nsec as u32))
  }
}

#[cfg(not(unix))]
impl Clock for SystemClock {
  fn now(&self) -> io::Result<Instant> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let since = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    Ok(Instant::new(since.as_secs() as i64, since.subsec_nanos()))
  }
}

/// Reads the local clock. Already Unix-epoch, no NTP conversion applies.
pub fn capture_local<C: Clock + ?Sized>(clock: &C) -> io::Result<Instant> {
  clock.now()
}
