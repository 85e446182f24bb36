//! Hostname denylist for shortening targets.

/// Set of hostnames that may not be shortened.
///
/// An entry matches the host itself and every subdomain of it: `evil.com`
/// blocks `evil.com` and `www.evil.com` but not `notevil.com`. Matching is
/// case-insensitive and ignores a trailing dot.
#[derive(Debug, Clone, Default)]
pub struct Denylist {
    hosts: Vec<String>,
}

impl Denylist {
    /// Builds a denylist from raw entries. Empty entries are ignored and any
    /// port suffix is dropped.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hosts: Vec<String> = entries
            .into_iter()
            .filter_map(|entry| normalize_entry(entry.as_ref()))
            .collect();
        hosts.sort();
        hosts.dedup();
        Self { hosts }
    }

    /// Parses a comma-separated list, e.g. `"evil.com, spam.net"`.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    /// Returns a copy with `host` added.
    pub fn with_host(mut self, host: &str) -> Self {
        if let Some(entry) = normalize_entry(host)
            && !self.hosts.contains(&entry)
        {
            self.hosts.push(entry);
        }
        self
    }

    /// Returns true if `host` is denied.
    pub fn is_denied(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.hosts.iter().any(|entry| {
            host == *entry
                || host
                    .strip_suffix(entry.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

/// Lowercases an entry and strips scheme, path and port.
fn normalize_entry(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let without_scheme = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority = without_scheme.split('/').next().unwrap_or_default();
    let host = if authority.starts_with('[') {
        authority
            .find(']')
            .map_or(authority, |end| &authority[..=end])
    } else {
        authority.split(':').next().unwrap_or_default()
    };
    let host = host.trim_end_matches('.').to_ascii_lowercase();

    (!host.is_empty()).then_some(host)
}
