//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{ConnectInfo, State, rejection::JsonRejection},
    http::HeaderMap,
};
use std::net::SocketAddr;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_identifier;

/// Creates a short URL, charged against the caller's quota.
///
/// # Endpoint
///
/// `POST /api/v1`
///
/// # Request Flow
///
/// 1. Parse the body (400 on malformed JSON)
/// 2. Check the client's quota (429 when exhausted)
/// 3. Validate and allocate the code (400 / 403 / 503)
/// 4. Charge the quota and report the remaining budget
///
/// Quota is only charged for successful allocations.
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "short": "promo",   // optional
///   "expiry": 48        // optional, hours
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "url": "https://example.com/some/long/path",
///   "short": "sho.rt/promo",
///   "expiry": 48,
///   "rate_limit": 9,
///   "rate_limit_reset": 30
/// }
/// ```
pub async fn shorten_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>, AppError> {
    let Json(payload) = payload?;
    let client_id = client_identifier(&headers, peer, state.behind_proxy);

    let quota = state.quota_service.check_and_reserve(&client_id).await?;
    if !quota.allowed {
        return Err(AppError::rate_limited(quota.reset_minutes()));
    }

    payload.validate()?;

    let link = state
        .link_service
        .allocate(&payload.url, payload.short.as_deref(), payload.expiry)
        .await?;

    // The link exists at this point; a failed charge must not fail the request
    let status = match state.quota_service.commit(&client_id).await {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!(client = %client_id, error = %e, "Failed to charge quota");
            quota.estimated_after_commit()
        }
    };

    Ok(Json(ShortenResponse {
        short: link.short_url(&state.public_domain),
        url: link.target,
        expiry: link.ttl_hours,
        rate_limit: status.remaining,
        rate_limit_reset: status.reset_minutes,
    }))
}
