pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Upper bound on pages in one drain; a server that keeps handing out
/// cursors past this is treated as a failed cycle.
pub const MAX_DRAIN_PAGES: usize = 1000;

pub const API_URL_VAR: &str = "DELIVERY_API_URL";
pub const PINCODE_VAR: &str = "DELIVERY_PINCODE";
pub const ACCESS_TOKEN_VAR: &str = "DELIVERY_ACCESS_TOKEN";
pub const POLL_INTERVAL_VAR: &str = "DELIVERY_POLL_INTERVAL_SECS";
pub const REQUEST_TIMEOUT_VAR: &str = "DELIVERY_REQUEST_TIMEOUT_SECS";
pub const DEBUG_VAR: &str = "DELIVERY_DEBUG";
