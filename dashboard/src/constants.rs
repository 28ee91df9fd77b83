//! Central repository for timeouts, intervals and limits
//!
//! Organized by category so every magic number has a single home.

use std::time::Duration;

/// HTTP client constants
pub mod http {
    use super::Duration;

    /// Timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
}

/// Polling bounds
pub mod polling {
    /// Shortest accepted tick period
    pub const MIN_INTERVAL_MS: u64 = 1_000;

    /// Longest accepted tick period (5 minutes)
    pub const MAX_INTERVAL_MS: u64 = 300_000;
}

/// Limits applied by views
pub mod limits {
    /// Default number of log lines kept by the log viewer
    pub const DEFAULT_LOG_TAIL: usize = 200;

    /// Hard cap for the `limit` query parameter on view requests
    pub const MAX_VIEW_LIMIT: usize = 5_000;
}

/// Default configuration values
pub mod defaults {
    pub const HOST: &str = "0.0.0.0";

    pub const PORT: u16 = 8095;

    pub const API_BASE_URL: &str = "http://127.0.0.1:8746";

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 10;

    /// Tick period used by panels that do not set their own
    pub const INTERVAL_MS: u64 = 5_000;

    pub const CONFIG_DIR: &str = "config";
}
