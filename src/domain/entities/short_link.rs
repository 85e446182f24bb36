//! Short link entity representing a code → target URL mapping.

use std::time::Duration;

/// Expiry applied when a request omits it or passes zero.
pub const DEFAULT_EXPIRY_HOURS: u32 = 24;

/// A freshly allocated short link.
///
/// Entries are never mutated after creation; the store drops them when
/// `ttl_hours` elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub code: String,
    pub target: String,
    pub ttl_hours: u32,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(code: String, target: String, ttl_hours: u32) -> Self {
        Self {
            code,
            target,
            ttl_hours,
        }
    }

    /// Lifetime of the entry as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_hours) * 3600)
    }

    /// Full short URL under the given public domain, e.g. `sho.rt/abc123`.
    pub fn short_url(&self, public_domain: &str) -> String {
        format!("{}/{}", public_domain.trim_end_matches('/'), self.code)
    }
}

/// A live entry as seen by operators: target plus remaining lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDetails {
    pub code: String,
    pub target: String,
    pub expires_in: Option<Duration>,
}
