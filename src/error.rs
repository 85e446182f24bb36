//! Application error type and its HTTP representation.
//!
//! Every failure crossing the HTTP boundary is an [`AppError`]. Each variant maps
//! to exactly one status code and renders as a flat JSON object:
//!
//! ```json
//! { "error": "Custom short URL already exists", "code": "conflict", "details": { "code": "promo" } }
//! ```
//!
//! Rate limit errors additionally carry `rate_limit_reset` (minutes until the
//! client's quota window expires).

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::repositories::StoreError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_limit_reset: Option<i64>,
    #[serde(skip_serializing_if = "Value::is_null")]
    details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed request body, invalid URL, code or expiry.
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// The requested short code is already live.
    #[error("{message}")]
    Conflict { message: String, details: Value },

    /// The client's quota for the current window is exhausted.
    #[error("Rate limit exceeded")]
    RateLimited { reset_minutes: i64 },

    /// The target host is on the denylist.
    #[error("{message}")]
    ForbiddenDomain { message: String, details: Value },

    /// Unknown or expired short code.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// Store unreachable or any unexpected failure.
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn rate_limited(reset_minutes: i64) -> Self {
        Self::RateLimited { reset_minutes }
    }
    pub fn forbidden_domain(message: impl Into<String>, details: Value) -> Self {
        Self::ForbiddenDomain {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::FORBIDDEN,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::ForbiddenDomain { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::Validation { message, details } => ErrorBody {
                error: message,
                code: "validation_error",
                rate_limit_reset: None,
                details,
            },
            AppError::Conflict { message, details } => ErrorBody {
                error: message,
                code: "conflict",
                rate_limit_reset: None,
                details,
            },
            AppError::RateLimited { reset_minutes } => ErrorBody {
                error: "Rate limit exceeded".to_string(),
                code: "rate_limited",
                rate_limit_reset: Some(reset_minutes),
                details: Value::Null,
            },
            AppError::ForbiddenDomain { message, details } => ErrorBody {
                error: message,
                code: "forbidden_domain",
                rate_limit_reset: None,
                details,
            },
            AppError::NotFound { message, details } => ErrorBody {
                error: message,
                code: "not_found",
                rate_limit_reset: None,
                details,
            },
            AppError::Internal { message, details } => ErrorBody {
                error: message,
                code: "internal_error",
                rate_limit_reset: None,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = %e, "Store operation failed");
        AppError::internal("Internal server error", Value::Null)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(
            "Invalid request",
            json!({ "reason": rejection.body_text() }),
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort();
        AppError::bad_request("Invalid request", json!({ "fields": fields }))
    }
}
