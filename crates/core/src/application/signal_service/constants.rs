// Signal service constants (no magic values)
use std::time::Duration;

/// Pause between the end of one scan and the start of the next (1s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Budget for one scanner invocation before it is killed (10s)
/// A zero budget is valid and means "no grace period"
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Status before the first poll has completed
pub const STATUS_LOADING: &str = "loading";

/// Status after a scan that found at least one access point
pub const STATUS_OK: &str = "ok";

/// Status after a scan that parsed cleanly but saw nothing
pub const STATUS_NO_NETWORKS: &str = "no networks found";

/// Prefix of the status published when scanner output could not be parsed
pub const STATUS_ERROR_PREFIX: &str = "error: ";

/// Status when the scanner printed nothing (not started, killed, or silent)
pub const STATUS_NO_OUTPUT: &str = "error: scanner produced no output";
