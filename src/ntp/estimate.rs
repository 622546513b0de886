use super::timestamp::{Instant, NtpShortTime, Span};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
/// The four timestamps of one request/reply exchange.
pub struct RoundTripSample {
  /// Client send
  pub t1: Instant,
  /// Server receive
  pub t2: Instant,
  /// Server transmit
  pub t3: Instant,
  /// Client receive
  pub t4: Instant,
  pub root_dispersion: NtpShortTime,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Estimate {
  /// Positive when the local clock is behind the server.
  pub offset: Span,
  /// Network transit time with the server's processing time removed.
  /// Negative when the two clocks disagree badly; never clamped.
  pub round_trip_delay: Span,
  pub one_way_delay: Span,
}

impl RoundTripSample {
  /// Offset and delay per RFC 5905 section 8, with no filtering.
  pub fn estimate(self) -> Estimate {
    let round_trip_delay = (self.t4 - self.t1) - (self.t3 - self.t2);
    let offset = ((self.t2 - self.t1) + (self.t3 - self.t4)).half();
    Estimate {
      offset: offset,
      round_trip_delay: round_trip_delay,
      one_way_delay: round_trip_delay.half(),
    }
  }
}
