//! Global constants for satview

/// Maximum number of recent locations kept in the query history
pub const HISTORY_LIMIT: usize = 5;

/// Durable storage key holding the JSON-encoded query history
pub const HISTORY_STORAGE_KEY: &str = "locationHistory";

/// Origin the imagery backend serves layer PNGs and GeoTIFFs from
pub const DEFAULT_BACKEND_ORIGIN: &str = "http://127.0.0.1:8001";

/// Path of the imagery generation endpoint, relative to the backend origin
pub const DEFAULT_QUERY_PATH: &str = "/gee/run";

/// Imagery generation waits on a remote export, so requests may take minutes
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Index readings are reported with two decimal places
pub const INDEX_PRECISION: f64 = 100.0;

/// Bytes per pixel in a decoded layer buffer (RGBA8)
pub const BYTES_PER_PIXEL: usize = 4;
