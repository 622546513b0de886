/// Logs a message at the error level then exits the process with the
/// given `ExitCode`.
///
/// Only for use once logging is initialized; earlier failures go straight
/// to stderr.
#[macro_export]
macro_rules! fatal {
  ($code:expr, $($arg:tt)*) => ({
    log::error!($($arg)*);
    ::std::process::exit($code as i32);
  });
}
