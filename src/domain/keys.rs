//! Storage key layout.
//!
//! All records share one store namespace and are separated by prefix.

/// Prefix for short code → target URL entries.
pub const LINK_PREFIX: &str = "link:";

/// Prefix for per-client quota counters.
pub const QUOTA_PREFIX: &str = "quota:";

/// Global counter of successful resolutions.
pub const RESOLUTION_COUNTER_KEY: &str = "stats:resolutions";

/// Key holding the target URL for `code`.
pub fn link_key(code: &str) -> String {
    format!("{LINK_PREFIX}{code}")
}

/// Key holding the remaining quota for `client_id`.
pub fn quota_key(client_id: &str) -> String {
    format!("{QUOTA_PREFIX}{client_id}")
}
