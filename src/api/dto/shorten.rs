//! DTOs for the link shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// URL to shorten. `http://` is assumed when no scheme is given.
    #[validate(length(min = 1, message = "URL is required"))]
    pub url: String,

    /// Optional custom short code. Empty means generate one.
    #[serde(default)]
    #[validate(length(max = 50))]
    pub short: Option<String>,

    /// Lifetime in hours. Missing or `0` means 24 hours.
    #[serde(default)]
    #[validate(range(min = 0, max = 876000))]
    pub expiry: Option<i64>,
}

/// Successful shortening result.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    /// Normalized target URL.
    pub url: String,
    /// Full short URL, `<domain>/<code>`.
    pub short: String,
    /// Effective lifetime in hours.
    pub expiry: u32,
    /// Shortenings left in the current quota window.
    pub rate_limit: i64,
    /// Minutes until the quota window resets.
    pub rate_limit_reset: i64,
}
