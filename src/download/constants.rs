//! Constants for the download module (timeouts, file naming).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for slow image servers).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Extension of every stored page image.
pub const PAGE_EXTENSION: &str = "jpg";

/// Suffix appended to the final file name while a download is in flight.
pub const PARTIAL_SUFFIX: &str = "part";
