//! URL normalization and validation.
//!
//! Normalization only enforces a scheme; the rest of the input is kept as the
//! client sent it so the stored target matches what was submitted.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlNormalizationError {
    #[error("URL must not be empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must contain a host")]
    MissingHost,
}

/// Normalizes a URL to the form stored in the registry.
///
/// # Rules
///
/// 1. Surrounding whitespace is trimmed
/// 2. Input without a scheme (`://`) is prefixed with `http://`
/// 3. The result must parse as an absolute HTTP or HTTPS URL with a host
///
/// Normalization is idempotent: a normalized URL already carries a scheme and
/// passes through unchanged.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed URLs.
/// Returns [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S) schemes.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_url("example.com").unwrap(), "http://example.com");
/// assert_eq!(normalize_url("https://example.com/a").unwrap(), "https://example.com/a");
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let parsed = parse_http_url(&candidate)?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::MissingHost);
    }

    Ok(candidate)
}

/// Returns the lowercase host of a normalized URL.
///
/// # Errors
///
/// Same as [`normalize_url`].
pub fn target_host(normalized: &str) -> Result<String, UrlNormalizationError> {
    let parsed = parse_http_url(normalized)?;
    parsed
        .host_str()
        .map(|host| host.trim_end_matches('.').to_ascii_lowercase())
        .ok_or(UrlNormalizationError::MissingHost)
}

fn parse_http_url(candidate: &str) -> Result<Url, UrlNormalizationError> {
    let url =
        Url::parse(candidate).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(UrlNormalizationError::UnsupportedProtocol),
    }
}
