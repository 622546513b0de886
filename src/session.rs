//! Per-server polling.
//!
//! A session walks `Idle -> AwaitingReply -> Result` once per poll: send the
//! request and stamp T1, block for one whole reply and stamp T4, then decode
//! and estimate. Pacing between polls is left to the caller of `run`.

use std::{error, fmt, io};
use crate::ntp::estimate::RoundTripSample;
use crate::ntp::pkt::{self, MalformedReply};
use crate::ntp::timestamp::{capture_local, Clock, NtpShortTime, Span};
use crate::ntp::window::DispersionWindow;
use crate::ntp::MAX_PACKET_LENGTH;
use crate::net::Channel;

#[derive(Debug)]
/// Everything that can end a session early. All of it is fatal.
pub enum SessionError {
  Send(io::Error),
  Receive(io::Error),
  Clock(io::Error),
  Malformed(MalformedReply),
}

impl fmt::Display for SessionError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      SessionError::Send(ref err) => write!(f, "Couldn't send request: {}", err),
      SessionError::Receive(ref err) => write!(f, "Couldn't receive reply: {}", err),
      SessionError::Clock(ref err) => write!(f, "Couldn't read clock: {}", err),
      SessionError::Malformed(ref err) => write!(f, "Malformed reply: {}", err),
    }
  }
}

impl error::Error for SessionError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match *self {
      SessionError::Send(ref err) => Some(err),
      SessionError::Receive(ref err) => Some(err),
      SessionError::Clock(ref err) => Some(err),
      SessionError::Malformed(ref err) => Some(err),
    }
  }
}

impl From<MalformedReply> for SessionError {
  fn from(err: MalformedReply) -> SessionError {
    SessionError::Malformed(err)
  }
}

#[derive(Clone, Debug, PartialEq)]
/// One line of output, produced per successful round trip.
pub struct PollResult {
  pub server: String,
  pub poll_index: u64,
  pub root_dispersion: NtpShortTime,
  pub jitter: Span,
  pub one_way_delay: Span,
  pub offset: Span,
}

impl fmt::Display for PollResult {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{};{};{};{};{};{}",
           self.server,
           self.poll_index,
           self.root_dispersion,
           self.jitter,
           self.one_way_delay,
           self.offset)
  }
}

/// The state kept for one server while it is being polled.
pub struct Session<'a, C: Channel, K: Clock + ?Sized> {
  server: String,
  channel: C,
  clock: &'a K,
  window: DispersionWindow,
}

impl<'a, C: Channel, K: Clock + ?Sized> Session<'a, C, K> {
  pub fn new(server: &str, channel: C, clock: &'a K) -> Session<'a, C, K> {
    Session {
      server: server.to_string(),
      channel: channel,
      clock: clock,
      window: DispersionWindow::new(),
    }
  }

  /// Performs one complete request/reply exchange.
  pub fn poll(&mut self) -> Result<PollResult, SessionError> {
    let poll_index = self.window.count();
    let msg = pkt::build_request();

    let t1 = capture_local(self.clock).map_err(SessionError::Clock)?;
    let sent = self.channel.send(&msg).map_err(SessionError::Send)?;
    info!("Sent {} bytes to {} ({})", sent, self.server, self.channel.peer());

    debug!("Waiting for reply from {}...", self.server);
    let mut buf = [0u8; MAX_PACKET_LENGTH];
    let (len, from) = self.channel.recv(&mut buf).map_err(SessionError::Receive)?;
    let t4 = capture_local(self.clock).map_err(SessionError::Clock)?;

    info!("Got packet from {}, {} bytes long", from, len);
    trace!("Packet content: {}", hex(&buf[..len]));

    let (reply, ext) = pkt::decode_reply(&buf[..len])?;
    if ext > 0 {
      warn!("{} bytes of extraneous data from {}", ext, from);
    }
    for anomaly in reply.header.anomalies() {
      warn!("Packet from {} {}", from, anomaly);
    }

    let sample = RoundTripSample {
      t1: t1,
      t2: reply.server_receive,
      t3: reply.server_transmit,
      t4: t4,
      root_dispersion: reply.root_dispersion,
    };
    debug!("t1: {}", sample.t1);
    debug!("t2: {}", sample.t2);
    debug!("t3: {}", sample.t3);
    debug!("t4: {}", sample.t4);

    let estimate = sample.estimate();
    let jitter = self.window.push(estimate.round_trip_delay);

    Ok(PollResult {
      server: self.server.clone(),
      poll_index: poll_index,
      root_dispersion: sample.root_dispersion,
      jitter: jitter,
      one_way_delay: estimate.one_way_delay,
      offset: estimate.offset,
    })
  }

  /// Polls `polls` times, handing each result to `emit` as soon as it exists.
  ///
  /// `pace` runs between consecutive polls, never after the last one.
  pub fn run<E, P>(mut self, polls: u32, mut emit: E, mut pace: P) -> Result<(), SessionError>
    where E: FnMut(&PollResult),
          P: FnMut()
  {
    for n in 0..polls {
      let result = self.poll()?;
      emit(&result);
      if n + 1 < polls {
        pace();
      }
    }
    Ok(())
  }
}

fn hex(bytes: &[u8]) -> String {
  bytes.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" ")
}
