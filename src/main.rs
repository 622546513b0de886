#[macro_use]
extern crate log;

use std::str::FromStr;
use std::{env, thread};

use sntpoll::args::{self, ArgsError};
use sntpoll::config;
use sntpoll::fatal;
use sntpoll::net::{self, NetError};
use sntpoll::ntp::timestamp::SystemClock;
use sntpoll::session::{Session, SessionError};

const DEFAULT_CONFIG: &'static str = "sntpoll.toml";

/// Environment variable naming an alternative config file.
const CONFIG_VAR: &'static str = "SNTPOLL_CONFIG";

/// Process exit status, one per class of fatal failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ExitCode {
  Usage = 1,
  NotNumeric = 2,
  NotPositive = 3,
  Resolve = 4,
  Socket = 5,
  Send = 6,
  Receive = 7,
  Clock = 8,
  Malformed = 9,
  Config = 10,
}

impl<'a> From<&'a ArgsError> for ExitCode {
  fn from(err: &'a ArgsError) -> ExitCode {
    match *err {
      ArgsError::Usage => ExitCode::Usage,
      ArgsError::NotNumeric(_) => ExitCode::NotNumeric,
      ArgsError::NotPositive => ExitCode::NotPositive,
    }
  }
}

impl<'a> From<&'a NetError> for ExitCode {
  fn from(err: &'a NetError) -> ExitCode {
    match *err {
      NetError::Resolve(..) => ExitCode::Resolve,
      NetError::Socket(_) => ExitCode::Socket,
    }
  }
}

impl<'a> From<&'a SessionError> for ExitCode {
  fn from(err: &'a SessionError) -> ExitCode {
    match *err {
      SessionError::Send(_) => ExitCode::Send,
      SessionError::Receive(_) => ExitCode::Receive,
      SessionError::Clock(_) => ExitCode::Clock,
      SessionError::Malformed(_) => ExitCode::Malformed,
    }
  }
}

/// Initialize Logging Subsystem
fn logging(cfg: &config::Log) -> Result<(), fern::InitError> {
  let level = log::LevelFilter::from_str(cfg.level.as_ref()).unwrap_or_else(|_| {
    eprintln!("That isn't a valid loglevel. Valid loglevels:{}{}{}{}{}{}",
              "\n\tOFF",
              "\n\tERROR",
              "\n\tWARN",
              "\n\tINFO",
              "\n\tDEBUG",
              "\n\tTRACE");
    std::process::exit(ExitCode::Config as i32);
  });

  let mut dispatch = fern::Dispatch::new()
    .format(|out, msg, record| {
      out.finish(format_args!("{} [{}] {}", record.level(), chrono::Local::now().to_rfc3339(), msg))
    })
    .level(level)
    .chain(std::io::stderr());

  // If specified, log to a file
  if let Some(ref filename) = cfg.file {
    dispatch = dispatch.chain(fern::log_file(filename)?);
  }

  dispatch.apply()?;
  Ok(())
}

fn main() {
  let args = args::parse(env::args().skip(1)).unwrap_or_else(|err| {
    eprintln!("sntpoll: {}", err);
    std::process::exit(ExitCode::from(&err) as i32);
  });

  // Apply configuration
  let config_file = env::var(CONFIG_VAR).unwrap_or_else(|_| DEFAULT_CONFIG.to_string());
  let cfg = config::Config::read_or_default(&config_file).unwrap_or_else(|err| {
    eprintln!("{}: {}", config_file, err);
    std::process::exit(ExitCode::Config as i32);
  });

  // Init logging
  logging(&cfg.log).unwrap_or_else(|err| {
    eprintln!("Couldn't initialize logging: {}", err);
    std::process::exit(ExitCode::Config as i32);
  });
  debug!("Configuration: {:?}", cfg);

  let clock = SystemClock;
  let interval = cfg.poll.interval();
  for server in &args.servers {
    let channel = net::open(server, cfg.network.port, cfg.poll.timeout())
      .unwrap_or_else(|err| fatal!(ExitCode::from(&err), "{}", err));

    let session = Session::new(server, channel, &clock);
    let polled = session.run(args.polls,
                             |result| println!("{}", result),
                             || {
                               trace!("Sleeping {:?}", interval);
                               thread::sleep(interval)
                             });
    if let Err(err) = polled {
      fatal!(ExitCode::from(&err), "{}: {}", server, err);
    }
    info!("Done with {}", server);
  }
}
