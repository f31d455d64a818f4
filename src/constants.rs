//! Global constants: attribute names, page sizes, timeouts, and session lifetimes
use std::time::Duration;

/// Binary name used in user agents and log output
pub const BINARY_NAME: &str = "imagedeck";

/// Package version from Cargo.toml (set at compile time)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the user agent string for RPC requests
pub fn user_agent() -> String {
    format!("{}/{}", BINARY_NAME, VERSION)
}

// ============================================================================
// Remote Attribute Names
// ============================================================================

/// Attribute carrying the record's numeric sequence identifier
pub const ATTR_ID: &str = "id";

/// Attribute carrying the free-text prompt
pub const ATTR_PROMPT: &str = "prompt";

/// Attribute used to scope queries to image records
pub const ATTR_TYPE: &str = "type";

/// Value of [`ATTR_TYPE`] for image records
pub const IMAGE_TYPE: &str = "image";

// ============================================================================
// Page Size Constants
// ============================================================================

/// Page size for anchor probe fetches
pub const PROBE_PAGE_SIZE: usize = 200;

/// Extra records requested on top of `perPage` for range queries,
/// absorbing gaps in the identifier sequence
pub const RANGE_HEADROOM: usize = 50;

/// Page size used when draining the whole collection
pub const MATERIALIZE_PAGE_SIZE: usize = 200;

/// Default `perPage` when the client does not specify one
pub const DEFAULT_PER_PAGE: usize = 20;

/// Upper bound on client-requested page sizes
pub const MAX_PER_PAGE: usize = 100;

// ============================================================================
// Session Constants
// ============================================================================

/// Idle lifetime of a cursor session, measured from its last touch
pub const SESSION_TTL: Duration = Duration::from_secs(300);

/// How often the background sweeper scans for expired sessions
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

// ============================================================================
// Timeout Constants
// ============================================================================

/// HTTP request timeout for RPC calls (seconds)
pub const HTTP_TIMEOUT_SECS: u64 = 60;
