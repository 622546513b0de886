use std::{error, fmt};

pub const USAGE: &'static str = "usage: sntpoll number_of_requests_per_server server1 server2 server3 ...";

#[derive(Debug, Eq, PartialEq)]
/// Command line operands.
pub struct Args {
  /// How many times each server is polled.
  pub polls: u32,
  pub servers: Vec<String>,
}

#[derive(Debug, Eq, PartialEq)]
pub enum ArgsError {
  /// Too few operands.
  Usage,
  /// The poll count is not made of digits only, or does not fit.
  NotNumeric(String),
  NotPositive,
}

impl fmt::Display for ArgsError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      ArgsError::Usage => write!(f, "{}", USAGE),
      ArgsError::NotNumeric(ref arg) => {
        write!(f, "wrong input {:?}! only digits for number_of_requests_per_server allowed!", arg)
      }
      ArgsError::NotPositive => {
        write!(f, "wrong input! only numbers > 0 for number_of_requests_per_server allowed!")
      }
    }
  }
}

impl error::Error for ArgsError {}

/// Parses the operands following the program name.
pub fn parse<I: IntoIterator<Item = String>>(operands: I) -> Result<Args, ArgsError> {
  let mut operands = operands.into_iter();
  let (count, servers) = match operands.next() {
    Some(count) => (count, operands.collect::<Vec<_>>()),
    None => return Err(ArgsError::Usage),
  };
  if servers.is_empty() {
    return Err(ArgsError::Usage);
  }

  if !count.bytes().all(|b| b.is_ascii_digit()) {
    return Err(ArgsError::NotNumeric(count));
  }
  // all digits, so the empty string counts as zero
  let polls = if count.is_empty() {
    0
  } else {
    count.parse::<u32>().map_err(|_| ArgsError::NotNumeric(count.clone()))?
  };
  if polls < 1 {
    return Err(ArgsError::NotPositive);
  }

  Ok(Args { polls: polls, servers: servers })
}
