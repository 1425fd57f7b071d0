/// User agent string for HTTP requests
pub const USER_AGENT: &str = "cwa-forecast-mcp/0.1.0";

/// Central Weather Administration open data base URL
pub const CWA_API_BASE: &str = "https://opendata.cwa.gov.tw/api/v1/rest/datastore";

/// Weekly county-level township forecast dataset
pub const CWA_DEFAULT_DATASET: &str = "F-D0047-091";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Marker written into any column an interval has no value for
pub const NOT_AVAILABLE: &str = "N/A";
