use std::{error, fmt, io};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug)]
/// Combined error type for configuration errors.
pub enum ConfigError {
  Io(io::Error),
  Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      ConfigError::Io(ref err) => write!(f, "Couldn't read config: {}", err),
      ConfigError::Parse(ref err) => write!(f, "Couldn't parse config: {}", err),
    }
  }
}

impl error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match *self {
      ConfigError::Io(ref err) => Some(err),
      ConfigError::Parse(ref err) => Some(err),
    }
  }
}

impl From<io::Error> for ConfigError {
  fn from(err: io::Error) -> ConfigError {
    ConfigError::Io(err)
  }
}

impl From<toml::de::Error> for ConfigError {
  fn from(err: toml::de::Error) -> ConfigError {
    ConfigError::Parse(err)
  }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
/// Configuration relating to the network.
pub struct Network {
  /// Server port, the same for every server.
  pub port: u16,
}

impl Default for Network {
  fn default() -> Network {
    Network { port: crate::ntp::PORT }
  }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
/// Configuration relating to the logging subsystem,
pub struct Log {
  pub level: String,
  pub file: Option<String>,
}

impl Default for Log {
  fn default() -> Log {
    Log { level: "info".to_string(), file: None }
  }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
/// Configuration relating to polling.
pub struct Poll {
  /// Seconds to wait between two polls of the same server.
  pub interval: u64,
  /// Seconds to wait for a reply before giving up. Waits forever if unset
  /// or zero.
  pub timeout: Option<u64>,
}

impl Default for Poll {
  fn default() -> Poll {
    Poll { interval: crate::ntp::POLL_INTERVAL, timeout: None }
  }
}

impl Poll {
  pub fn interval(&self) -> Duration {
    Duration::from_secs(self.interval)
  }

  pub fn timeout(&self) -> Option<Duration> {
    self.timeout.filter(|&secs| secs > 0).map(Duration::from_secs)
  }
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
/// General configuration superstructure.
pub struct Config {
  /// Configuration relating to the network.
  pub network: Network,
  /// Configuration relating to the logging subsystem,
  pub log: Log,
  /// Configuration relating to polling.
  pub poll: Poll,
}

impl Config {
  /// Read configuration from a file.
  pub fn read<P: AsRef<Path>>(filename: P) -> Result<Config, ConfigError> {
    let config_text = fs::read_to_string(filename)?;
    Config::parse(&config_text)
  }

  /// Read configuration from a file, or use the defaults if there is none.
  pub fn read_or_default<P: AsRef<Path>>(filename: P) -> Result<Config, ConfigError> {
    match Config::read(filename) {
      Err(ConfigError::Io(ref err)) if err.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
      other => other,
    }
  }

  pub fn parse(config_text: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(config_text)?)
  }
}
