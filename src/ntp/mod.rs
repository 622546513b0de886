pub mod estimate;
pub mod pkt;
pub mod timestamp;
pub mod window;

/// NTP Port Number
pub const PORT: u16 = 123;

/// NTP Version Number
pub const VERSION: u8 = 4;

/// Mode of a client request.
pub const MODE_CLIENT: u8 = 3;

/// Mode of a server reply.
pub const MODE_SERVER: u8 = 4;

/// Length of an NTP header without extension fields.
pub const PACKET_LENGTH: usize = 48;

/// The maximum packet length that will be received.
pub const MAX_PACKET_LENGTH: usize = 128;

/// Seconds between 1900-01-01 (NTP era 0) and 1970-01-01 (Unix epoch).
pub const EPOCH_DELTA: i64 = 2_208_988_800;

/// Number of round-trip delays kept per server for the jitter estimate.
pub const WINDOW_SIZE: usize = 8;

/// Default pause between two polls of the same server (s)
pub const POLL_INTERVAL: u64 = 8;

/// maximum stratum number
pub const MAXSTRAT: u8 = 16;
