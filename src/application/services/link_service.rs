//! Short code allocation and resolution service.

use std::sync::Arc;

use serde_json::json;

use crate::application::services::AnalyticsService;
use crate::domain::entities::short_link::DEFAULT_EXPIRY_HOURS;
use crate::domain::entities::{LinkDetails, ShortLink};
use crate::domain::keys::link_key;
use crate::domain::repositories::KeyValueStore;
use crate::error::AppError;
use crate::utils::code_generator::{generate_code, validate_custom_code};
use crate::utils::denylist::Denylist;
use crate::utils::url_normalizer::{normalize_url, target_host};

/// Upper bound on link lifetime (100 years).
pub const MAX_EXPIRY_HOURS: i64 = 876_000;

/// Attempts at drawing an unused generated code before giving up.
const MAX_GENERATE_ATTEMPTS: usize = 3;

/// Service owning the code → target registry.
///
/// Entries are written with an atomic set-if-absent, so two concurrent
/// allocations of the same code cannot both succeed.
pub struct LinkService {
    store: Arc<dyn KeyValueStore>,
    analytics: Arc<AnalyticsService>,
    denylist: Denylist,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        analytics: Arc<AnalyticsService>,
        denylist: Denylist,
    ) -> Self {
        Self {
            store,
            analytics,
            denylist,
        }
    }

    /// Allocates a short code for `target_url`.
    ///
    /// # Arguments
    ///
    /// - `target_url` - URL to shorten; `http://` is prefixed when no scheme is given
    /// - `requested_code` - custom code used verbatim; `None` or empty generates one
    /// - `expiry_hours` - lifetime in hours; `None` or `0` means 24 hours
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL, code or expiry is invalid.
    /// Returns [`AppError::ForbiddenDomain`] if the target host is denylisted.
    /// Returns [`AppError::Conflict`] if the requested code is already live.
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn allocate(
        &self,
        target_url: &str,
        requested_code: Option<&str>,
        expiry_hours: Option<i64>,
    ) -> Result<ShortLink, AppError> {
        let ttl_hours = resolve_expiry_hours(expiry_hours)?;
        let requested_code = requested_code.filter(|code| !code.is_empty());
        if let Some(code) = requested_code {
            validate_custom_code(code)?;
        }

        let target = self.screen_target(target_url)?;

        let link = match requested_code {
            Some(code) => {
                let link = ShortLink::new(code.to_string(), target, ttl_hours);
                if !self.try_store(&link).await? {
                    return Err(AppError::conflict(
                        "Custom short URL already exists",
                        json!({ "code": code }),
                    ));
                }
                link
            }
            None => self.store_with_generated_code(target, ttl_hours).await?,
        };

        tracing::info!(code = %link.code, ttl_hours = link.ttl_hours, "Short link created");
        Ok(link)
    }

    /// Resolves `code` to its target URL.
    ///
    /// On success the global resolution counter is bumped in a detached task;
    /// that increment never affects the result.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown or expired.
    /// Returns [`AppError::Internal`] on store errors.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        let target = self
            .store
            .get(&link_key(code))
            .await?
            .ok_or_else(|| AppError::not_found("URL not found", json!({ "code": code })))?;

        self.analytics.record_resolution();

        Ok(target)
    }

    /// Returns the target and remaining lifetime of `code` without counting a resolution.
    ///
    /// # Errors
    ///
    /// Same as [`Self::resolve`].
    pub async fn inspect(&self, code: &str) -> Result<LinkDetails, AppError> {
        let key = link_key(code);
        let target = self
            .store
            .get(&key)
            .await?
            .ok_or_else(|| AppError::not_found("URL not found", json!({ "code": code })))?;
        let expires_in = self.store.ttl(&key).await?;

        Ok(LinkDetails {
            code: code.to_string(),
            target,
            expires_in,
        })
    }

    /// Normalizes `target_url` and rejects denylisted hosts.
    fn screen_target(&self, target_url: &str) -> Result<String, AppError> {
        let invalid = |e: crate::utils::url_normalizer::UrlNormalizationError| {
            AppError::bad_request("Invalid URL", json!({ "reason": e.to_string() }))
        };

        let target = normalize_url(target_url).map_err(invalid)?;
        let host = target_host(&target).map_err(invalid)?;

        if self.denylist.is_denied(&host) {
            tracing::warn!(host = %host, "Refused to shorten denylisted host");
            return Err(AppError::forbidden_domain(
                "Shortening this domain is not allowed",
                json!({ "host": host }),
            ));
        }

        Ok(target)
    }

    /// Writes the entry unless its code is live. Returns `false` on conflict.
    async fn try_store(&self, link: &ShortLink) -> Result<bool, AppError> {
        Ok(self
            .store
            .set_if_absent(&link_key(&link.code), &link.target, link.ttl())
            .await?)
    }

    /// Draws random codes until one is free.
    async fn store_with_generated_code(
        &self,
        target: String,
        ttl_hours: u32,
    ) -> Result<ShortLink, AppError> {
        for _ in 0..MAX_GENERATE_ATTEMPTS {
            let link = ShortLink::new(generate_code(), target.clone(), ttl_hours);
            if self.try_store(&link).await? {
                return Ok(link);
            }
            tracing::debug!(code = %link.code, "Generated code collided, retrying");
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions" }),
        ))
    }
}

/// Applies the default expiry and checks bounds.
fn resolve_expiry_hours(expiry_hours: Option<i64>) -> Result<u32, AppError> {
    match expiry_hours.unwrap_or(0) {
        0 => Ok(DEFAULT_EXPIRY_HOURS),
        hours if (1..=MAX_EXPIRY_HOURS).contains(&hours) => Ok(hours as u32),
        hours => Err(AppError::bad_request(
            "Expiry must be a positive number of hours",
            json!({ "expiry": hours, "max": MAX_EXPIRY_HOURS }),
        )),
    }
}
